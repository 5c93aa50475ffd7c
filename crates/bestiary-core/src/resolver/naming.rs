//! Name normalization: filesystem slugs and wiki article titles.

use crate::config::WikiConfig;

/// Characters removed from slugs.
const SLUG_RESERVED_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Normalize a name into a filesystem-safe cache key.
///
/// # Rules Applied
/// 1. Convert to lowercase
/// 2. Replace spaces with underscores
/// 3. Remove `\ / * ? : " < > |`
///
/// # Examples
///
/// ```
/// use bestiary_core::resolver::slug;
///
/// assert_eq!(slug("Red Fox"), "red_fox");
/// assert_eq!(slug("Cat/Dog?"), "catdog");
/// ```
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| !SLUG_RESERVED_CHARS.contains(c))
        .collect()
}

/// Wiki article title for a name: words lowercased, joined with `_`, first
/// character upper-cased. `"Red Fox"` becomes `"Red_fox"`.
pub fn canonical_title(name: &str) -> String {
    let joined = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Article URL for an already canonical title.
pub fn article_url(title: &str) -> String {
    format!(
        "{}{}{}",
        WikiConfig::BASE_URL,
        WikiConfig::ARTICLE_PREFIX,
        urlencoding::encode(title)
    )
}

/// Article URL for `<Title>_<suffix>`, e.g. `Robin_(bird)`.
pub fn suffixed_article_url(name: &str, suffix: &str) -> String {
    article_url(&format!("{}_{}", canonical_title(name), suffix))
}

/// Full-text search URL for a raw name.
pub fn search_url(name: &str) -> String {
    format!(
        "{}{}{}",
        WikiConfig::BASE_URL,
        WikiConfig::SEARCH_PATH,
        urlencoding::encode(name)
    )
}
