//! Discovery of further listing pages from a page's pagination block.

use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};

use crate::extract::resolve_url;

/// Pagination containers, probed in order; only the first match is read.
static PAGINATION_BLOCKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".pagination",
        ".pager",
        ".page-nav",
        r#"nav[aria-label="pagination"]"#,
    ]
    .into_iter()
    .map(|css| Selector::parse(css).expect("valid pagination selector"))
    .collect()
});

static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Absolute URLs of every link in the first pagination block of `html`,
/// resolved against `base_url` and deduplicated in document order.
///
/// In-page anchors and `javascript:` links are ignored.
#[must_use]
pub fn extract_pagination_links(html: &str, base_url: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let Some(block) = PAGINATION_BLOCKS
        .iter()
        .find_map(|selector| doc.select(selector).next())
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    block
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.starts_with('#') && !href.to_lowercase().starts_with("javascript:"))
        .filter_map(|href| resolve_url(base.as_ref(), href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
