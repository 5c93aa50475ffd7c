//! Error types for Bestiary.
//!
//! Image resolution never surfaces these to the caller; the resolver logs them and
//! falls back. They do surface from source fetching, extraction, configuration
//! and report rendering, where there is nothing sensible to fall back to.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the Bestiary library.
#[derive(Debug, Error)]
pub enum BestiaryError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    // Content errors
    #[error("Expected an image from {url}, got content type {content_type:?}")]
    NotAnImage {
        url: String,
        content_type: Option<String>,
    },

    #[error("No valid image found for {name}")]
    NoImageFound { name: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Image encoding error: {0}")]
    Encode(String),

    // Configuration errors
    #[error("Configuration error for {field}: {message}")]
    Config { field: String, message: String },
}

/// Result type alias for Bestiary operations.
pub type Result<T> = std::result::Result<T, BestiaryError>;

impl From<std::io::Error> for BestiaryError {
    fn from(err: std::io::Error) -> Self {
        BestiaryError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BestiaryError {
    fn from(err: serde_json::Error) -> Self {
        BestiaryError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<image::ImageError> for BestiaryError {
    fn from(err: image::ImageError) -> Self {
        BestiaryError::Encode(err.to_string())
    }
}

impl BestiaryError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        BestiaryError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Map a reqwest error for `url`, keeping timeouts distinguishable.
    pub fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            BestiaryError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            BestiaryError::Network {
                message: format!("GET {} failed", url),
                cause: Some(err.to_string()),
            }
        }
    }

    /// True for failures of the remote side or the connection to it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BestiaryError::Network { .. }
                | BestiaryError::Timeout { .. }
                | BestiaryError::HttpStatus { .. }
        )
    }

    /// True when the remote answered but not with what we needed.
    pub fn is_content_mismatch(&self) -> bool {
        matches!(
            self,
            BestiaryError::NotAnImage { .. } | BestiaryError::NoImageFound { .. }
        )
    }
}
