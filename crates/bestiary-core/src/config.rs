//! Centralized configuration for Bestiary.
//!
//! `WikiConfig` holds the fixed constants of the wiki we scrape (URLs, the image
//! heuristics). `BestiaryConfig` holds the per-run options, loadable from JSON and
//! overridable from the command line.

use crate::error::{BestiaryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Constants describing the wiki and its media host.
pub struct WikiConfig;

impl WikiConfig {
    pub const BASE_URL: &'static str = "https://en.wikipedia.org";
    pub const ARTICLE_PREFIX: &'static str = "/wiki/";
    pub const SEARCH_PATH: &'static str = "/w/index.php?search=";
    pub const MEDIA_HOST: &'static str = "upload.wikimedia.org";
    pub const SOURCE_URL: &'static str = "https://en.wikipedia.org/wiki/List_of_animal_names";
    pub const FALLBACK_IMAGE_URL: &'static str = "https://upload.wikimedia.org/wikipedia/commons/thumb/6/65/No-Image-Placeholder.svg/330px-No-Image-Placeholder.svg.png";

    /// Disambiguator suffixes tried, in order, once every other strategy failed.
    pub const DISAMBIGUATION_SUFFIXES: &'static [&'static str] =
        &["(bird)", "(animal)", "(mammal)", "(fish)"];

    /// Substrings marking icons, logos and other non-photo assets.
    pub const IMAGE_BLOCKLIST: &'static [&'static str] = &[
        "wiktionary",
        "disambig",
        "question_book",
        "ambox",
        "commons-logo",
        "p_vip",
        "wikidata-logo",
        "wikispecies-logo",
        "edit",
        "icon",
    ];
}

/// File names inside the output directory.
pub struct PathsConfig;

impl PathsConfig {
    pub const OUTPUT_DIR_NAME: &'static str = "bestiary";
    pub const IMAGE_EXTENSION: &'static str = "jpg";
    pub const FALLBACK_FILENAME: &'static str = "fallback.jpg";
    pub const REPORT_FILENAME: &'static str = "index.html";
    pub const SOURCE_CACHE_FILENAME: &'static str = "bestiary_source_cache.html";
}

/// Per-run options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BestiaryConfig {
    /// Where images, the fallback and (by default) the report are written.
    pub output_directory: PathBuf,
    /// Maximum number of resolutions in flight.
    pub concurrency_width: usize,
    /// Timeout applied to every individual request.
    pub request_timeout_seconds: u64,
    /// Sent on every outbound request.
    pub user_agent_string: String,
    /// Page holding the record tables.
    pub source_url: String,
    /// On-disk copy of the source page; `None` uses the temp directory.
    pub source_cache_path: Option<PathBuf>,
    /// Report destination; `None` puts `index.html` in the output directory.
    pub report_path: Option<PathBuf>,
}

impl BestiaryConfig {
    pub const DEFAULT_CONCURRENCY: usize = 10;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Load a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| BestiaryError::io_with_path(e, path))?;
        let config: BestiaryConfig = serde_json::from_str(&contents).map_err(|e| {
            BestiaryError::Json {
                message: format!("Failed to parse {}: {}", path.display(), e),
                source: Some(e),
            }
        })?;
        Ok(config)
    }

    /// Reject values that would stall or disable the run.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_width == 0 {
            return Err(BestiaryError::Config {
                field: "concurrency_width".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(BestiaryError::Config {
                field: "request_timeout_seconds".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.user_agent_string.trim().is_empty() {
            return Err(BestiaryError::Config {
                field: "user_agent_string".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn with_concurrency_width(mut self, width: usize) -> Self {
        self.concurrency_width = width;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_seconds = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent_string = user_agent.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn fallback_path(&self) -> PathBuf {
        self.output_directory.join(PathsConfig::FALLBACK_FILENAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.output_directory.join(PathsConfig::REPORT_FILENAME))
    }

    pub fn source_cache_path(&self) -> PathBuf {
        self.source_cache_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(PathsConfig::SOURCE_CACHE_FILENAME))
    }
}

impl Default for BestiaryConfig {
    fn default() -> Self {
        Self {
            output_directory: std::env::temp_dir().join(PathsConfig::OUTPUT_DIR_NAME),
            concurrency_width: Self::DEFAULT_CONCURRENCY,
            request_timeout_seconds: Self::DEFAULT_TIMEOUT_SECS,
            user_agent_string: format!(
                "bestiary/{} (https://example.com/; contact@example.com)",
                env!("CARGO_PKG_VERSION")
            ),
            source_url: WikiConfig::SOURCE_URL.to_string(),
            source_cache_path: None,
            report_path: None,
        }
    }
}
