//! Shared placeholder image used when a name cannot be resolved.

use crate::network::{download_image, WebClient};
use crate::storage::atomic_write_bytes;
use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_GREY: Rgb<u8> = Rgb([200, 200, 200]);

/// Lazily materialized `fallback.jpg`.
///
/// The first caller of [`FallbackImage::ensure`] downloads the placeholder (or
/// generates one when the download fails); every other caller waits for that and
/// gets the same path.
#[derive(Debug)]
pub struct FallbackImage {
    path: PathBuf,
    source_url: String,
    ready: OnceCell<()>,
}

impl FallbackImage {
    pub fn new(path: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_url: source_url.into(),
            ready: OnceCell::new(),
        }
    }

    /// Location of the fallback, whether or not it exists yet.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the fallback exists on disk and return its path.
    pub async fn ensure(&self, client: &dyn WebClient) -> &Path {
        self.ready
            .get_or_init(|| async { self.materialize(client).await })
            .await;
        &self.path
    }

    async fn materialize(&self, client: &dyn WebClient) {
        if self.path.exists() {
            debug!("Fallback image already present at {}", self.path.display());
            return;
        }

        match download_image(client, &self.source_url, &self.path).await {
            Ok(_) => info!("Fallback image downloaded to {}", self.path.display()),
            Err(e) => {
                warn!("Failed to download fallback image: {}; generating one", e);
                if let Err(e) = write_placeholder(&self.path) {
                    error!("Failed to write fallback image {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// Encode a plain grey JPEG and write it to `path`.
pub fn write_placeholder(path: &Path) -> Result<()> {
    let img = RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_GREY);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 85).encode_image(&img)?;
    atomic_write_bytes(path, &bytes)
}
