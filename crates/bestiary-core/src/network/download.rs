//! Image download: fetch, verify the content type, persist atomically.

use crate::network::client::{extract_domain, WebClient};
use crate::storage::atomic_write_bytes;
use crate::{BestiaryError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Download an image from `url` into `destination`.
///
/// Fails without touching `destination` when the request fails or the response
/// does not declare an image content type. Returns the number of bytes written.
pub async fn download_image(
    client: &dyn WebClient,
    url: &str,
    destination: &Path,
) -> Result<u64> {
    debug!("Downloading image from {} ({})", url, extract_domain(url));
    let payload = client.get_bytes(url).await?;

    if !payload.is_image() {
        return Err(BestiaryError::NotAnImage {
            url: url.to_string(),
            content_type: payload.content_type,
        });
    }

    atomic_write_bytes(destination, &payload.bytes)?;
    info!(
        "Downloaded {} bytes to {}",
        payload.bytes.len(),
        destination.display()
    );
    Ok(payload.bytes.len() as u64)
}
