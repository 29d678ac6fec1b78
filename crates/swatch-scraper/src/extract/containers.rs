//! Tier 1: one record per structural container.

use reqwest::Url;
use scraper::{ElementRef, Html};
use swatch_core::{BrandRecord, UNKNOWN_BRAND};

use super::colors::{flatten_text, ColorSet};
use super::media::media_url;
use super::selectors::{
    COLOR_BLOCKS, CONTAINER_NAME_ATTRS, CONTAINER_NAME_PROBES, CONTAINER_RULES, IMG,
};

/// Containers matched by the first selector in [`CONTAINER_RULES`] that
/// matches anything, together with that selector.
pub(super) fn find_containers(doc: &Html) -> Option<(&'static str, Vec<ElementRef<'_>>)> {
    CONTAINER_RULES.iter().find_map(|(css, selector)| {
        let found: Vec<ElementRef<'_>> = doc.select(selector).collect();
        (!found.is_empty()).then_some((*css, found))
    })
}

/// Builds the record for one container, or `None` when it carries no
/// resolvable media URL.
pub(super) fn parse_container(
    container: ElementRef<'_>,
    base: Option<&Url>,
    page_url: &str,
) -> Option<BrandRecord> {
    let img = container.select(&IMG).next()?;
    let media = media_url(img, base)?;

    let brand_name = container_brand_name(container, img);

    let mut colors = ColorSet::default();
    colors.insert_scope(container);
    for block in container.select(&COLOR_BLOCKS) {
        colors.insert_scope(block);
    }
    colors.insert_attribute_colors(container);

    Some(BrandRecord::new(
        brand_name,
        media,
        page_url,
        colors.into_vec(),
    ))
}

fn container_brand_name(container: ElementRef<'_>, img: ElementRef<'_>) -> String {
    let from_probe = CONTAINER_NAME_PROBES.iter().find_map(|probe| {
        let el = container.select(probe).next()?;
        let text = flatten_text(el);
        (!text.is_empty()).then_some(text)
    });
    if let Some(name) = from_probe {
        return name;
    }

    let from_attr = CONTAINER_NAME_ATTRS
        .iter()
        .find_map(|attr| {
            container
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        });
    if let Some(name) = from_attr {
        return name.to_owned();
    }

    img.value()
        .attr("alt")
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .map_or_else(|| UNKNOWN_BRAND.to_owned(), str::to_owned)
}
