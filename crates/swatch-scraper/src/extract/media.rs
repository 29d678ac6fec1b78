use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::ElementRef;

use super::selectors::MEDIA_URL_ATTRS;

static BACKGROUND_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(["']?([^"'()]+)["']?\)"#).expect("valid background url regex")
});

/// Lowercased URL fragments that mark non-content images.
const EXCLUDED_FRAGMENTS: [&str; 9] = [
    "/icon",
    "/logo",
    "/placeholder",
    "/loading",
    "data:image",
    "/avatar",
    "/thumb",
    "_small",
    "_mini",
];

const EXCLUDED_SUFFIXES: [&str; 1] = [".ico"];

/// Whether `url` looks like a content image rather than chrome.
///
/// This is a denylist: icons, logos, avatars, thumbnails and placeholders are
/// rejected, everything else is accepted.
#[must_use]
pub fn is_valid_media(url: &str) -> bool {
    let lower = url.to_lowercase();
    !(EXCLUDED_FRAGMENTS.iter().any(|f| lower.contains(f))
        || EXCLUDED_SUFFIXES.iter().any(|s| lower.ends_with(s)))
}

/// Resolves `candidate` against `base`. Without a base only already-absolute
/// URLs survive.
pub(crate) fn resolve_url(base: Option<&Url>, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    let resolved = match base {
        Some(base) => base.join(candidate).ok()?,
        None => Url::parse(candidate).ok()?,
    };
    Some(resolved.to_string())
}

/// URL of a media element, taken from the first non-empty attribute in
/// [`MEDIA_URL_ATTRS`] order.
pub(super) fn media_url(img: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let raw = MEDIA_URL_ATTRS
        .iter()
        .find_map(|attr| img.value().attr(attr).filter(|v| !v.trim().is_empty()))?;
    resolve_url(base, raw)
}

/// Raw `url(...)` targets declared in an inline style.
pub(super) fn background_urls(style: &str) -> Vec<&str> {
    BACKGROUND_URL_RE
        .captures_iter(style)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
        .filter(|s| !s.is_empty())
        .collect()
}
