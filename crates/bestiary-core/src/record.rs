//! The record entity flowing through the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named animal and its collateral adjectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub tags: Vec<String>,
    /// Set once by the batch coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolved_image: Option<PathBuf>,
}

impl Record {
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tags,
            resolved_image: None,
        }
    }

    pub fn resolved_image(&self) -> Option<&Path> {
        self.resolved_image.as_deref()
    }

    /// Attach the resolved image. Returns `false` and keeps the first value if an
    /// image was already assigned.
    pub fn assign_image(&mut self, path: PathBuf) -> bool {
        if self.resolved_image.is_some() {
            return false;
        }
        self.resolved_image = Some(path);
        true
    }
}
