//! Brand record extraction from listing pages.
//!
//! Extraction runs in two tiers. Structural containers are tried first and
//! yield one record per container. When no container selector matches, the
//! whole document is scanned instead: every content image becomes a record
//! and all records share the page-level colors and brand name.
//!
//! Extraction never fails. Malformed markup degrades to fewer (or zero)
//! records.

mod colors;
mod containers;
mod document;
mod media;
mod selectors;

pub use media::is_valid_media;
pub(crate) use media::resolve_url;

use reqwest::Url;
use scraper::Html;
use swatch_core::{BrandRecord, UNKNOWN_BRAND};

/// Turns fetched page markup into [`BrandRecord`]s.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    base: Option<Url>,
}

impl ContentExtractor {
    /// Creates an extractor resolving relative links against `base_url`.
    ///
    /// An unparseable base is logged and ignored; only absolute links are
    /// kept in that case.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base = match Url::parse(base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(base_url, error = %e, "invalid base url; relative links will be dropped");
                None
            }
        };
        Self { base }
    }

    /// The base used for relative link resolution, if any.
    #[must_use]
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Extracts every brand record from `html`. `page_url` is stamped on each
    /// record as its source page and may be empty.
    #[must_use]
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<BrandRecord> {
        let doc = Html::parse_document(html);
        let base = self.base.as_ref();

        if let Some((selector, found)) = containers::find_containers(&doc) {
            let candidates = found.len();
            let records: Vec<BrandRecord> = found
                .into_iter()
                .filter_map(|container| containers::parse_container(container, base, page_url))
                .collect();
            tracing::info!(
                selector,
                containers = candidates,
                records = records.len(),
                "extracted records from containers"
            );
            return records;
        }

        tracing::debug!(page_url, "no container selector matched; scanning whole document");
        self.extract_document(&doc, page_url)
    }

    fn extract_document(&self, doc: &Html, page_url: &str) -> Vec<BrandRecord> {
        let media = document::collect_media(doc, self.base.as_ref());
        if media.is_empty() {
            tracing::debug!(page_url, "no content images found");
            return Vec::new();
        }

        let colors = document::collect_colors(doc);
        let brand_name =
            document::document_brand_name(doc).unwrap_or_else(|| UNKNOWN_BRAND.to_owned());

        tracing::info!(
            images = media.len(),
            colors = colors.len(),
            brand = %brand_name,
            "extracted records from whole document"
        );

        media
            .into_iter()
            .map(|url| BrandRecord::new(brand_name.clone(), url, page_url, colors.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;
