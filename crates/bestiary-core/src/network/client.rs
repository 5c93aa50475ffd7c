//! HTTP client used for every page and image request.
//!
//! `WebClient` is the seam between the resolver and the network. `HttpClient` is
//! the reqwest-backed implementation: one client per run, built with the
//! configured timeout and user agent.

use crate::config::BestiaryConfig;
use crate::{BestiaryError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

/// Body of a binary response together with its declared content type.
#[derive(Debug, Clone)]
pub struct Payload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Payload {
    /// True when the declared content type names an image.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("image"))
            .unwrap_or(false)
    }
}

/// Minimal GET interface the resolver and the source fetcher depend on.
///
/// Non-success statuses are reported as errors by implementations.
#[async_trait]
pub trait WebClient: Send + Sync {
    /// Fetch a page as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Fetch raw bytes along with the content type header.
    async fn get_bytes(&self, url: &str) -> Result<Payload>;
}

/// reqwest-backed `WebClient`.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client from the run configuration.
    pub fn from_config(config: &BestiaryConfig) -> Result<Self> {
        Self::new(config.request_timeout(), &config.user_agent_string)
    }

    /// Create a client with an explicit timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| BestiaryError::Network {
                message: "Failed to create HTTP client".to_string(),
                cause: Some(e.to_string()),
            })?;

        Ok(Self { client, timeout })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BestiaryError::from_reqwest(e, url, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BestiaryError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl WebClient for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        response
            .text()
            .await
            .map_err(|e| BestiaryError::from_reqwest(e, url, self.timeout))
    }

    async fn get_bytes(&self, url: &str) -> Result<Payload> {
        let response = self.send(url).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BestiaryError::from_reqwest(e, url, self.timeout))?;

        Ok(Payload {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Extract the host from a URL.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_image() {
        let payload = |ct: Option<&str>| Payload {
            content_type: ct.map(str::to_string),
            bytes: Vec::new(),
        };
        assert!(payload(Some("image/jpeg")).is_image());
        assert!(payload(Some("Image/PNG; charset=binary")).is_image());
        assert!(!payload(Some("text/html; charset=UTF-8")).is_image());
        assert!(!payload(None).is_image());
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg"),
            "upload.wikimedia.org"
        );
        assert_eq!(extract_domain("invalid-url"), "unknown");
    }

    #[test]
    fn test_client_creation() {
        let config = BestiaryConfig::default();
        assert!(HttpClient::from_config(&config).is_ok());
    }
}
