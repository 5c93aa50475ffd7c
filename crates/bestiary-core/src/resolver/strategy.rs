//! The ordered strategy chain that turns a name into an image URL.
//!
//! Each strategy is one step of the chain. Steps share a [`ChainContext`] that
//! remembers the most recently visited page, so the disambiguation steps can
//! inspect whatever the previous step landed on. A failing step (network error,
//! bad status) only abandons that step.

use crate::config::WikiConfig;
use crate::network::WebClient;
use crate::resolver::naming::{article_url, canonical_title, search_url, suffixed_article_url};
use crate::resolver::page::{search_result_link, PageSummary};
use crate::{BestiaryError, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// One step of the resolution chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Article at the canonical title.
    DirectLookup,
    /// First article link of a disambiguation page.
    Disambiguation,
    /// First full-text search hit.
    Search,
    /// Disambiguation check again, on the page search landed on.
    DisambiguationRetry,
    /// Canonical title plus `(bird)`, `(animal)`, `(mammal)`, `(fish)`.
    SuffixFallback,
}

impl Strategy {
    pub const CHAIN: [Strategy; 5] = [
        Strategy::DirectLookup,
        Strategy::Disambiguation,
        Strategy::Search,
        Strategy::DisambiguationRetry,
        Strategy::SuffixFallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::DirectLookup => "direct_lookup",
            Strategy::Disambiguation => "disambiguation",
            Strategy::Search => "search",
            Strategy::DisambiguationRetry => "disambiguation_retry",
            Strategy::SuffixFallback => "suffix_fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State carried from one step to the next.
#[derive(Debug)]
pub(crate) struct ChainContext<'a> {
    pub name: &'a str,
    pub last_page: Option<PageSummary>,
}

impl<'a> ChainContext<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            last_page: None,
        }
    }
}

/// Run every strategy in order until one yields an image URL.
///
/// Fails with [`BestiaryError::NoImageFound`] once the chain is exhausted.
pub(crate) async fn run_chain(client: &dyn WebClient, name: &str) -> Result<(Strategy, String)> {
    let mut ctx = ChainContext::new(name);

    for strategy in Strategy::CHAIN {
        match attempt(strategy, client, &mut ctx).await {
            Ok(Some(url)) => {
                info!(name, %strategy, url = %url, "image candidate accepted");
                return Ok((strategy, url));
            }
            Ok(None) => debug!(name, %strategy, "no image from strategy"),
            Err(e) if e.is_transient() => {
                warn!(name, %strategy, error = %e, "strategy abandoned")
            }
            Err(e) => debug!(name, %strategy, error = %e, "strategy abandoned"),
        }
    }

    Err(BestiaryError::NoImageFound {
        name: name.to_string(),
    })
}

/// Execute a single strategy.
pub(crate) async fn attempt(
    strategy: Strategy,
    client: &dyn WebClient,
    ctx: &mut ChainContext<'_>,
) -> Result<Option<String>> {
    match strategy {
        Strategy::DirectLookup => {
            let url = article_url(&canonical_title(ctx.name));
            debug!("Looking up {} at {}", ctx.name, url);
            visit(client, &url, ctx).await
        }
        Strategy::Disambiguation | Strategy::DisambiguationRetry => {
            let link = match &ctx.last_page {
                Some(page) if page.is_disambiguation => page.first_article_link.clone(),
                _ => None,
            };
            match link {
                Some(url) => {
                    debug!("Following disambiguation link for {}: {}", ctx.name, url);
                    visit(client, &url, ctx).await
                }
                None => Ok(None),
            }
        }
        Strategy::Search => {
            let html = client.get_text(&search_url(ctx.name)).await?;
            match search_result_link(&html) {
                Some(url) => {
                    debug!("Search resolved {} to {}", ctx.name, url);
                    visit(client, &url, ctx).await
                }
                None => Ok(None),
            }
        }
        Strategy::SuffixFallback => {
            for suffix in WikiConfig::DISAMBIGUATION_SUFFIXES {
                let url = suffixed_article_url(ctx.name, suffix);
                debug!("Trying suffix fallback: {}", url);
                match visit(client, &url, ctx).await {
                    Ok(Some(image)) => return Ok(Some(image)),
                    Ok(None) => {}
                    Err(e) => debug!("Suffix fallback {} failed: {}", url, e),
                }
            }
            Ok(None)
        }
    }
}

/// Fetch a page, remember it as the last visited page, return its image.
async fn visit(
    client: &dyn WebClient,
    url: &str,
    ctx: &mut ChainContext<'_>,
) -> Result<Option<String>> {
    let html = client.get_text(url).await?;
    let summary = PageSummary::parse(&html);
    let image = summary.image_url.clone();
    ctx.last_page = Some(summary);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Payload;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Pages(HashMap<String, String>);

    #[async_trait]
    impl WebClient for Pages {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| BestiaryError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }

        async fn get_bytes(&self, url: &str) -> Result<Payload> {
            Err(BestiaryError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    const PHOTO: &str = r#"<html><body><table class="infobox"><tr><td>
        <img src="//upload.wikimedia.org/wikipedia/commons/a/ab/Photo.jpg"></td></tr></table></body></html>"#;

    #[test]
    fn test_chain_order() {
        assert_eq!(
            Strategy::CHAIN.map(|s| s.as_str()),
            [
                "direct_lookup",
                "disambiguation",
                "search",
                "disambiguation_retry",
                "suffix_fallback"
            ]
        );
    }

    #[tokio::test]
    async fn test_disambiguation_needs_a_disambiguation_page() {
        let client = Pages(HashMap::new());
        let mut ctx = ChainContext::new("Fox");
        ctx.last_page = Some(PageSummary {
            image_url: None,
            is_disambiguation: false,
            first_article_link: Some("https://en.wikipedia.org/wiki/Red_fox".into()),
        });

        let result = attempt(Strategy::Disambiguation, &client, &mut ctx).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_direct_lookup_records_last_page() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://en.wikipedia.org/wiki/Fox".to_string(),
            r#"<html><body><p>Fox may refer to:</p>
               <div class="mw-parser-output"><ul><li><a href="/wiki/Red_fox">Red fox</a></li></ul></div>
               </body></html>"#
                .to_string(),
        );
        pages.insert("https://en.wikipedia.org/wiki/Red_fox".to_string(), PHOTO.to_string());
        let client = Pages(pages);
        let mut ctx = ChainContext::new("fox");

        assert!(attempt(Strategy::DirectLookup, &client, &mut ctx).await.unwrap().is_none());
        assert!(ctx.last_page.as_ref().unwrap().is_disambiguation);

        let image = attempt(Strategy::Disambiguation, &client, &mut ctx).await.unwrap();
        assert_eq!(
            image.as_deref(),
            Some("https://upload.wikimedia.org/wikipedia/commons/a/ab/Photo.jpg")
        );
    }

    #[tokio::test]
    async fn test_suffix_fallback_skips_failing_pages() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://en.wikipedia.org/wiki/Bass_%28fish%29".to_string(),
            PHOTO.to_string(),
        );
        let client = Pages(pages);

        let (strategy, url) = run_chain(&client, "Bass").await.unwrap();
        assert_eq!(strategy, Strategy::SuffixFallback);
        assert_eq!(url, "https://upload.wikimedia.org/wikipedia/commons/a/ab/Photo.jpg");
    }

    #[tokio::test]
    async fn test_chain_exhausted() {
        let client = Pages(HashMap::new());
        assert!(matches!(
            run_chain(&client, "Snark").await,
            Err(BestiaryError::NoImageFound { name }) if name == "Snark"
        ));
    }
}
