//! Tier 2: whole-document fallback when no structural container matches.

use std::collections::HashSet;

use reqwest::Url;
use scraper::Html;
use swatch_core::ColorIdentifier;

use super::colors::{flatten_text, ColorSet};
use super::media::{background_urls, is_valid_media, media_url, resolve_url};
use super::selectors::{COLOR_BLOCKS, DOCUMENT_NAME_PROBES, H1, IMG, STYLED, TITLE};

/// Every content image on the page: `<img>` elements first, then inline-style
/// background images. Non-content images are dropped and duplicates removed,
/// keeping first-seen order.
pub(super) fn collect_media(doc: &Html, base: Option<&Url>) -> Vec<String> {
    let from_imgs = doc.select(&IMG).filter_map(|img| media_url(img, base));

    let from_styles = doc.select(&STYLED).flat_map(|el| {
        let style = el.value().attr("style").unwrap_or_default();
        background_urls(style)
            .into_iter()
            .filter_map(|raw| resolve_url(base, raw))
            .collect::<Vec<_>>()
    });

    let mut seen: HashSet<String> = HashSet::new();
    from_imgs
        .chain(from_styles)
        .filter(|url| is_valid_media(url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// One color list shared by every record on the page.
pub(super) fn collect_colors(doc: &Html) -> Vec<ColorIdentifier> {
    let root = doc.root_element();
    let mut colors = ColorSet::default();

    colors.insert_text_matches(&flatten_text(root), None);
    colors.insert_attribute_colors(root);
    for block in doc.select(&COLOR_BLOCKS) {
        colors.insert_scope(block);
    }

    tracing::debug!(colors = colors.len(), "collected page-level colors");
    colors.into_vec()
}

/// Page-level brand name: the title up to the first `|` or `-`, then the
/// first `<h1>`, then a few label classes.
pub(super) fn document_brand_name(doc: &Html) -> Option<String> {
    if let Some(title) = doc.select(&TITLE).next() {
        let text = title.text().collect::<String>();
        let head = text
            .split('|')
            .next()
            .unwrap_or_default()
            .split('-')
            .next()
            .unwrap_or_default()
            .trim();
        if !head.is_empty() {
            return Some(head.to_owned());
        }
    }

    if let Some(h1) = doc.select(&H1).next() {
        let text = flatten_text(h1);
        if !text.is_empty() {
            return Some(text);
        }
    }

    DOCUMENT_NAME_PROBES.iter().find_map(|probe| {
        let text = flatten_text(doc.select(probe).next()?);
        (!text.is_empty()).then_some(text)
    })
}
