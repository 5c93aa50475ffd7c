//! In-run resolution cache.

use dashmap::DashMap;
use std::path::PathBuf;

/// Slug → resolved path, shared by every worker of a run.
///
/// The first value stored for a slug is kept for the rest of the run; later
/// inserts for the same slug return the existing value. Nothing is evicted.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<String, PathBuf>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slug: &str) -> Option<PathBuf> {
        self.entries.get(slug).map(|entry| entry.value().clone())
    }

    /// Store `path` unless the slug already has a value; returns the value that
    /// ends up cached.
    pub fn insert(&self, slug: &str, path: PathBuf) -> PathBuf {
        self.entries
            .entry(slug.to_string())
            .or_insert(path)
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
