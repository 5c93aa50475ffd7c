//! Network access for pages and images.
//!
//! This module provides:
//! - The `WebClient` seam and its reqwest implementation
//! - Image download with content-type verification and atomic persistence

mod client;
mod download;

pub use client::{extract_domain, HttpClient, Payload, WebClient};
pub use download::download_image;
