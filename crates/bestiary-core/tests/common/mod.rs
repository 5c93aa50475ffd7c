//! Shared fixtures for integration tests: an in-memory wiki.

#![allow(dead_code)]

use async_trait::async_trait;
use bestiary_core::{BestiaryConfig, BestiaryError, Payload, Result, WebClient, WikiConfig};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

pub const WIKI: &str = "https://en.wikipedia.org/wiki/";
pub const MEDIA: &str = "https://upload.wikimedia.org/wikipedia/commons/";

/// A `WebClient` serving canned pages and images.
///
/// Unknown URLs answer 404; URLs marked as failing return a network error.
/// The fallback placeholder is always available.
pub struct StubClient {
    pages: HashMap<String, String>,
    images: HashMap<String, (String, Vec<u8>)>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl StubClient {
    pub fn new() -> Self {
        let mut images = HashMap::new();
        images.insert(
            WikiConfig::FALLBACK_IMAGE_URL.to_string(),
            ("image/png".to_string(), b"placeholder".to_vec()),
        );
        Self {
            pages: HashMap::new(),
            images,
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, content_type: &str) -> Self {
        let url = url.into();
        let bytes = format!("bytes of {url}").into_bytes();
        self.images.insert(url, (content_type.to_string(), bytes));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn record(&self, url: &str) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(BestiaryError::Network {
                message: format!("GET {} failed", url),
                cause: Some("connection reset".into()),
            });
        }
        Ok(())
    }

    fn not_found(url: &str) -> BestiaryError {
        BestiaryError::HttpStatus {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl WebClient for StubClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.record(url)?;
        self.pages.get(url).cloned().ok_or_else(|| Self::not_found(url))
    }

    async fn get_bytes(&self, url: &str) -> Result<Payload> {
        self.record(url)?;
        let (content_type, bytes) = self
            .images
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))?;
        Ok(Payload {
            content_type: Some(content_type),
            bytes,
        })
    }
}

/// Article with one infobox thumbnail of `file` (e.g. `a/ab/Fox.jpg`).
pub fn article_with_image(file: &str) -> String {
    let name = file.rsplit('/').next().unwrap_or(file);
    format!(
        r#"<html><body><div class="mw-parser-output">
        <table class="infobox biota"><tr><td>
          <img src="//upload.wikimedia.org/wikipedia/commons/thumb/{file}/220px-{name}">
        </td></tr></table>
        <p>An animal.</p></div></body></html>"#
    )
}

/// Article whose only pictures are rejected by the validity heuristic.
pub fn article_without_image() -> String {
    r#"<html><body><div class="mw-parser-output">
        <img src="//upload.wikimedia.org/wikipedia/commons/thumb/4/4a/Map.svg/220px-Map.svg.png">
        <img src="//upload.wikimedia.org/wikipedia/en/9/99/Question_book-new.png">
        <p>A bird of some kind.</p></div></body></html>"#
        .to_string()
}

/// Disambiguation page listing `targets` (article titles).
pub fn disambiguation_page(subject: &str, targets: &[&str]) -> String {
    let items: String = targets
        .iter()
        .map(|t| format!(r#"<li><a href="/wiki/{t}">{t}</a></li>"#))
        .collect();
    format!(
        r#"<html><body><div class="mw-parser-output">
        <p><b>{subject}</b> may refer to:</p><ul>{items}</ul></div></body></html>"#
    )
}

/// Search results page whose first hit is `target`.
pub fn search_results(target: &str) -> String {
    format!(
        r#"<html><body><ul class="mw-search-results">
        <li><div class="mw-search-result-heading"><a href="/wiki/{target}">{target}</a></div></li>
        </ul></body></html>"#
    )
}

pub fn search_url(query: &str) -> String {
    format!("https://en.wikipedia.org/w/index.php?search={}", urlencode(query))
}

fn urlencode(query: &str) -> String {
    query.replace(' ', "%20")
}

pub fn config(dir: &Path) -> BestiaryConfig {
    BestiaryConfig::default()
        .with_output_directory(dir.join("images"))
        .with_concurrency_width(4)
}

pub fn create_test_env() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
