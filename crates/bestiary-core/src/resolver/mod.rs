//! Name-to-image resolution.
//!
//! [`ImageResolver::resolve`] never fails: it checks the in-run cache, then the
//! output directory, then walks the [`Strategy`] chain and downloads the first
//! accepted candidate. Anything that goes wrong ends at the shared fallback image.
//!
//! ```text
//! name ──► memory cache ──► <out>/<slug>.jpg ──► strategy chain ──► download
//!               │                  │                    │              │
//!               └──────── hit ─────┴──── exhausted ─────┴─── failed ───┴──► fallback.jpg
//! ```

mod cache;
mod fallback;
mod naming;
mod page;
mod strategy;

pub use cache::ResolutionCache;
pub use fallback::{write_placeholder, FallbackImage};
pub use naming::{article_url, canonical_title, search_url, slug, suffixed_article_url};
pub use page::{
    find_image_url, full_resolution_url, is_disambiguation_page, is_valid_image,
    search_result_link, PageSummary,
};
pub use strategy::Strategy;

use crate::config::{BestiaryConfig, PathsConfig, WikiConfig};
use crate::network::{download_image, HttpClient, WebClient};
use crate::storage::ensure_directory;
use crate::{BestiaryError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where a resolved path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "strategy")]
pub enum ResolutionSource {
    /// Already resolved earlier in this run.
    Memory,
    /// File left in the output directory by a previous run.
    Disk,
    /// Downloaded after the given strategy found a candidate.
    Strategy(Strategy),
    Fallback,
}

/// Result of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub path: PathBuf,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }
}

/// Resolves names to local image files.
///
/// One resolver is shared by every worker of a run; the cache and the fallback
/// are safe to use concurrently.
pub struct ImageResolver {
    client: Arc<dyn WebClient>,
    output_dir: PathBuf,
    cache: ResolutionCache,
    fallback: FallbackImage,
}

impl ImageResolver {
    /// Build a resolver with an HTTP client derived from the config.
    pub fn new(config: &BestiaryConfig) -> Result<Self> {
        let client = HttpClient::from_config(config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Build a resolver around an existing client.
    pub fn with_client(config: &BestiaryConfig, client: Arc<dyn WebClient>) -> Self {
        if let Err(e) = ensure_directory(&config.output_directory) {
            warn!(
                "Could not create output directory {}: {}",
                config.output_directory.display(),
                e
            );
        }

        Self {
            client,
            output_dir: config.output_directory.clone(),
            cache: ResolutionCache::new(),
            fallback: FallbackImage::new(config.fallback_path(), WikiConfig::FALLBACK_IMAGE_URL),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Canonical image location for a name: `<out>/<slug>.jpg`.
    ///
    /// A slug that would land on the shared fallback file gets a trailing `_`,
    /// so `"Fallback"` maps to `fallback_.jpg`.
    pub fn target_path(&self, name: &str) -> PathBuf {
        let file_name = format!("{}.{}", slug(name), PathsConfig::IMAGE_EXTENSION);
        if file_name == PathsConfig::FALLBACK_FILENAME {
            return self
                .output_dir
                .join(format!("{}_.{}", slug(name), PathsConfig::IMAGE_EXTENSION));
        }
        self.output_dir.join(file_name)
    }

    /// Resolve a name to an existing image file, falling back when needed.
    pub async fn resolve(&self, name: &str) -> PathBuf {
        self.resolve_detailed(name).await.path
    }

    /// Like [`resolve`](Self::resolve), also reporting how the path was found.
    pub async fn resolve_detailed(&self, name: &str) -> Resolution {
        let key = slug(name.trim());
        if key.is_empty() {
            warn!("Empty name, using fallback image");
            return Resolution {
                path: self.fallback_path().await,
                source: ResolutionSource::Fallback,
            };
        }

        if let Some(path) = self.cache.get(&key) {
            debug!("Cache hit for {}: {}", name, path.display());
            return Resolution {
                path,
                source: ResolutionSource::Memory,
            };
        }

        let target = self.target_path(name.trim());
        if target.exists() {
            debug!("Found existing image for {} at {}", name, target.display());
            return Resolution {
                path: self.cache.insert(&key, target),
                source: ResolutionSource::Disk,
            };
        }

        let (strategy, url) = match strategy::run_chain(self.client.as_ref(), name.trim()).await {
            Ok(found) => found,
            Err(e) => {
                info!("{}, using fallback", e);
                return self.fall_back(&key).await;
            }
        };

        match download_image(self.client.as_ref(), &url, &target).await {
            Ok(_) => Resolution {
                path: self.cache.insert(&key, target),
                source: ResolutionSource::Strategy(strategy),
            },
            Err(e @ BestiaryError::Io { .. }) => {
                error!("Failed to save image for {}: {}", name, e);
                Resolution {
                    path: self.cache.insert(&key, target),
                    source: ResolutionSource::Strategy(strategy),
                }
            }
            Err(e) if e.is_content_mismatch() => {
                info!("Rejected download for {}: {}", name, e);
                self.fall_back(&key).await
            }
            Err(e) => {
                warn!("Download of {} for {} failed: {}", url, name, e);
                self.fall_back(&key).await
            }
        }
    }

    /// Where the shared fallback image lives, whether or not it exists yet.
    pub fn fallback_location(&self) -> &Path {
        self.fallback.path()
    }

    /// Path of the shared fallback image, materializing it on first use.
    pub async fn fallback_path(&self) -> PathBuf {
        self.fallback.ensure(self.client.as_ref()).await.to_path_buf()
    }

    async fn fall_back(&self, key: &str) -> Resolution {
        let fallback = self.fallback_path().await;
        Resolution {
            path: self.cache.insert(key, fallback),
            source: ResolutionSource::Fallback,
        }
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("output_dir", &self.output_dir)
            .field("cached", &self.cache.len())
            .field("fallback", &self.fallback.path())
            .finish()
    }
}
