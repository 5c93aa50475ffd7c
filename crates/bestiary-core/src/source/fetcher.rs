//! Source page retrieval with an on-disk copy.

use crate::config::BestiaryConfig;
use crate::network::WebClient;
use crate::storage::atomic_write_bytes;
use crate::{BestiaryError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches the page holding the record tables.
///
/// The page is kept at `cache_path` and reused on later runs unless a refresh is
/// requested.
pub struct SourceFetcher {
    client: Arc<dyn WebClient>,
    url: String,
    cache_path: PathBuf,
    refresh: bool,
}

impl SourceFetcher {
    pub fn new(
        client: Arc<dyn WebClient>,
        url: impl Into<String>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            cache_path: cache_path.into(),
            refresh: false,
        }
    }

    pub fn from_config(config: &BestiaryConfig, client: Arc<dyn WebClient>) -> Self {
        Self::new(client, config.source_url.clone(), config.source_cache_path())
    }

    /// Ignore any cached copy and download the page again.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub async fn fetch(&self) -> Result<String> {
        if !self.refresh && self.cache_path.exists() {
            debug!("Reading source page from {}", self.cache_path.display());
            return std::fs::read_to_string(&self.cache_path)
                .map_err(|e| BestiaryError::io_with_path(e, &self.cache_path));
        }

        info!("Fetching source page {}", self.url);
        let html = self.client.get_text(&self.url).await?;

        if let Err(e) = atomic_write_bytes(&self.cache_path, html.as_bytes()) {
            warn!("Failed to cache source page: {}", e);
        }
        Ok(html)
    }
}
