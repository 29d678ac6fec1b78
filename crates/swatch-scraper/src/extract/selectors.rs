//! CSS selector tables used by page extraction.
//!
//! Update these lists when the target site changes its markup; the probing
//! order is significant wherever a list is documented as ordered.

use std::sync::LazyLock;

use scraper::Selector;

fn compile(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Structural container selectors, probed in order. The first one that matches
/// anything defines the container set; selectors are never combined.
pub(super) static CONTAINER_RULES: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    [
        ".product-item",
        ".brand-item",
        ".design-item",
        ".gallery-item",
        ".trend-item",
        ".color-card",
        "article.item",
        ".card",
        "[data-pantone]",
        ".style-item",
    ]
    .into_iter()
    .map(|css| (css, compile(css)))
    .collect()
});

/// Media URL attributes in priority order: high-resolution, lazy-load, plain.
pub(super) const MEDIA_URL_ATTRS: [&str; 4] = ["data-original", "data-src", "data-lazy-src", "src"];

pub(super) static IMG: LazyLock<Selector> = LazyLock::new(|| compile("img"));

pub(super) static STYLED: LazyLock<Selector> = LazyLock::new(|| compile("[style]"));

pub(super) static TITLE: LazyLock<Selector> = LazyLock::new(|| compile("title"));

pub(super) static H1: LazyLock<Selector> = LazyLock::new(|| compile("h1"));

/// Brand-name probes inside a container: headings first, then label classes.
pub(super) static CONTAINER_NAME_PROBES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1", "h2", "h3", "h4", ".title", ".name", ".brand"]
        .into_iter()
        .map(compile)
        .collect()
});

/// Data attributes on a container that may carry the brand name.
pub(super) const CONTAINER_NAME_ATTRS: [&str; 2] = ["data-brand", "data-name"];

/// Page-level label classes consulted after the title and first heading.
pub(super) static DOCUMENT_NAME_PROBES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [".brand-name", ".designer-name", ".title"]
        .into_iter()
        .map(compile)
        .collect()
});

/// Nested elements that typically hold one color swatch.
pub(super) static COLOR_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| compile(".pantone, .color-info, .color-block, .pantone-color"));

/// Attribute holding a pre-formatted identifier such as `PANTONE 19-4052 Classic Blue`.
pub(super) const COLOR_ATTR: &str = "data-color";

/// Sibling attribute holding the swatch hex value.
pub(super) const HEX_ATTR: &str = "data-hex";

pub(super) static COLOR_ATTR_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| compile("[data-color]"));
