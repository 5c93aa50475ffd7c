//! Article page inspection: image candidates, disambiguation markers, links.
//!
//! Everything here is synchronous and returns owned data. `scraper::Html` is not
//! `Send`, so documents are parsed and dropped inside these functions and never
//! held across an `.await` in the resolver.

use crate::config::WikiConfig;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

static INFOBOX_IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("table.infobox img"));
static ALL_IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static DISAMBIGUATION_MARKERS: LazyLock<Selector> =
    LazyLock::new(|| selector("table.ambox-disambig, .mw-disambig"));
static CONTENT_LIST_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector(".mw-parser-output ul li a"));
static SEARCH_RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector(".mw-search-result-heading a"));
static PARAGRAPH_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("p a"));

const DISAMBIGUATION_PHRASE: &str = "may refer to:";

/// What the resolver needs to know about one visited page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// First valid image, already rewritten to its full-resolution URL.
    pub image_url: Option<String>,
    pub is_disambiguation: bool,
    /// First plain article link in the content lists, as an absolute URL.
    pub first_article_link: Option<String>,
}

impl PageSummary {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        Self {
            image_url: find_image(&doc),
            is_disambiguation: detect_disambiguation(&doc),
            first_article_link: find_first_article_link(&doc),
        }
    }
}

/// Image validity heuristic: hosted on the media domain, not an icon/logo/marker,
/// not an SVG (rendered or not).
pub fn is_valid_image(src: &str) -> bool {
    let src_lower = src.to_lowercase();
    src_lower.contains(WikiConfig::MEDIA_HOST)
        && !WikiConfig::IMAGE_BLOCKLIST
            .iter()
            .any(|kw| src_lower.contains(kw))
        && !src_lower.ends_with(".svg")
        && !src_lower.ends_with(".svg.png")
}

/// Rewrite a thumbnail URL to the original upload and force `https:` on
/// protocol-relative URLs.
///
/// `//upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Fox.jpg/220px-Fox.jpg`
/// becomes `https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg`.
pub fn full_resolution_url(src: &str) -> String {
    let rewritten = match src.split_once("/thumb/") {
        Some((prefix, rest)) => {
            let parts: Vec<&str> = rest.split('/').collect();
            if parts.len() >= 3 {
                let last = parts[parts.len() - 1];
                let filename = last.split_once("px-").map(|(_, f)| f).unwrap_or(last);
                format!("{}/{}/{}/{}", prefix, parts[0], parts[1], filename)
            } else {
                src.to_string()
            }
        }
        None => src.to_string(),
    };
    upgrade_scheme(&rewritten)
}

fn upgrade_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// First valid image URL on a page, infobox first.
pub fn find_image_url(html: &str) -> Option<String> {
    find_image(&Html::parse_document(html))
}

/// Whether a page lists several subjects instead of describing one.
pub fn is_disambiguation_page(html: &str) -> bool {
    detect_disambiguation(&Html::parse_document(html))
}

/// First search hit, or the first link inside a paragraph when the results page
/// has no hit headings.
pub fn search_result_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&SEARCH_RESULT_LINKS)
        .next()
        .or_else(|| doc.select(&PARAGRAPH_LINKS).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(absolute_url)
}

fn find_image(doc: &Html) -> Option<String> {
    for img in doc.select(&INFOBOX_IMAGES) {
        let src = img.value().attr("src").unwrap_or("");
        debug!("Infobox image candidate: {}", src);
        if !is_valid_image(src) {
            debug!("Rejected image: {}", src);
            continue;
        }
        let url = full_resolution_url(src);
        debug!("Accepted infobox image: {}", url);
        return Some(url);
    }

    for img in doc.select(&ALL_IMAGES) {
        let src = img.value().attr("src").unwrap_or("");
        if is_valid_image(src) {
            let url = full_resolution_url(src);
            debug!("Accepted page image: {}", url);
            return Some(url);
        }
    }

    None
}

fn detect_disambiguation(doc: &Html) -> bool {
    if doc.select(&DISAMBIGUATION_MARKERS).next().is_some() {
        return true;
    }
    doc.root_element()
        .text()
        .collect::<String>()
        .to_lowercase()
        .contains(DISAMBIGUATION_PHRASE)
}

fn find_first_article_link(doc: &Html) -> Option<String> {
    doc.select(&CONTENT_LIST_LINKS)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| {
            href.starts_with(WikiConfig::ARTICLE_PREFIX)
                && !href.contains(':')
                && !href.contains('#')
        })
        .and_then(absolute_url)
}

fn absolute_url(href: &str) -> Option<String> {
    let base = url::Url::parse(WikiConfig::BASE_URL).ok()?;
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOX_THUMB: &str =
        "//upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Fox.jpg/220px-Fox.jpg";

    #[test]
    fn test_thumbnail_rewrite() {
        assert_eq!(
            full_resolution_url(FOX_THUMB),
            "https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg"
        );
        assert_eq!(
            full_resolution_url("//upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg"),
            "https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg"
        );
        let thumb = "https://upload.wikimedia.org/wikipedia/en/thumb/1/12/Owl.png/330px-Owl.png";
        assert_eq!(
            full_resolution_url(thumb),
            "https://upload.wikimedia.org/wikipedia/en/1/12/Owl.png"
        );
    }

    #[test]
    fn test_validity_predicate() {
        assert!(is_valid_image(FOX_THUMB));
        assert!(is_valid_image("https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg"));

        assert!(!is_valid_image("//upload.wikimedia.org/wikipedia/commons/7/72/Disambig.png"));
        assert!(!is_valid_image(
            "//upload.wikimedia.org/wikipedia/commons/9/99/Wiktionary_logo.png"
        ));
        assert!(!is_valid_image("//upload.wikimedia.org/wikipedia/commons/4/4a/Fox.svg"));
        assert!(!is_valid_image(
            "//upload.wikimedia.org/wikipedia/commons/thumb/4/4a/Fox.svg/220px-Fox.svg.png"
        ));
        assert!(!is_valid_image("//upload.wikimedia.org/wikipedia/commons/1/1e/Edit-icon.png"));
        assert!(!is_valid_image("https://example.org/images/Fox.jpg"));
        assert!(!is_valid_image(""));
    }

    #[test]
    fn test_infobox_image_preferred() {
        let html = format!(
            r#"<html><body>
            <img src="//upload.wikimedia.org/wikipedia/commons/b/bb/Banner.jpg">
            <table class="infobox biota">
              <tr><td><img src="//upload.wikimedia.org/wikipedia/commons/1/1e/Ambox_important.png"></td></tr>
              <tr><td><img src="{FOX_THUMB}"></td></tr>
            </table></body></html>"#
        );
        assert_eq!(
            find_image_url(&html).as_deref(),
            Some("https://upload.wikimedia.org/wikipedia/commons/a/ab/Fox.jpg")
        );
    }

    #[test]
    fn test_falls_back_to_any_page_image() {
        let html = r#"<html><body>
            <table class="infobox"><tr><td><img src="/static/images/icons/wikipedia.png"></td></tr></table>
            <div><img src="//upload.wikimedia.org/wikipedia/commons/c/cc/Owl.jpg"></div>
            </body></html>"#;
        assert_eq!(
            find_image_url(html).as_deref(),
            Some("https://upload.wikimedia.org/wikipedia/commons/c/cc/Owl.jpg")
        );
        assert_eq!(find_image_url("<html><body><p>No pictures</p></body></html>"), None);
    }

    #[test]
    fn test_disambiguation_by_phrase() {
        let html = "<html><body><p>Robin may refer to:</p><ul><li>Nothing</li></ul></body></html>";
        assert!(is_disambiguation_page(html));
        assert!(is_disambiguation_page(
            "<html><body><p>ROBIN MAY REFER TO: a bird</p></body></html>"
        ));
    }

    #[test]
    fn test_disambiguation_by_marker() {
        let html = r#"<html><body><div class="mw-disambig">x</div></body></html>"#;
        assert!(is_disambiguation_page(html));
        let html = r#"<html><body><table class="ambox ambox-disambig"><tr><td>x</td></tr></table></body></html>"#;
        assert!(is_disambiguation_page(html));
        let html = "<html><body><p>The red fox is a fox.</p></body></html>";
        assert!(!is_disambiguation_page(html));
    }

    #[test]
    fn test_first_article_link_skips_namespaced_and_anchors() {
        let html = r##"<html><body><div class="mw-parser-output">
            <ul>
              <li><a href="#See_also">See also</a></li>
              <li><a href="/wiki/Help:Disambiguation">Help</a></li>
              <li><a href="https://example.org/robin">External</a></li>
              <li><a href="/wiki/American_robin">American robin</a></li>
              <li><a href="/wiki/European_robin">European robin</a></li>
            </ul></div></body></html>"##;
        let summary = PageSummary::parse(html);
        assert_eq!(
            summary.first_article_link.as_deref(),
            Some("https://en.wikipedia.org/wiki/American_robin")
        );
    }

    #[test]
    fn test_search_result_link() {
        let html = r#"<html><body>
            <p>Did you mean <a href="/wiki/Special:Search">something</a></p>
            <ul><li><div class="mw-search-result-heading"><a href="/wiki/Red_fox">Red fox</a></div></li></ul>
            </body></html>"#;
        assert_eq!(
            search_result_link(html).as_deref(),
            Some("https://en.wikipedia.org/wiki/Red_fox")
        );

        let html = r#"<html><body><p>See <a href="/wiki/Fox">Fox</a></p></body></html>"#;
        assert_eq!(
            search_result_link(html).as_deref(),
            Some("https://en.wikipedia.org/wiki/Fox")
        );
        assert_eq!(search_result_link("<html><body></body></html>"), None);
    }
}
