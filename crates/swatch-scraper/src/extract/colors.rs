use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use swatch_core::ColorIdentifier;

use super::selectors::{COLOR_ATTR, COLOR_ATTR_ELEMENTS, HEX_ATTR, STYLED};
use crate::rules::{first_match, match_all};

static STYLE_HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})").expect("valid hex regex"));

/// Colors collected for one scope, unique by code in first-seen order.
#[derive(Debug, Default)]
pub(super) struct ColorSet {
    seen: HashSet<String>,
    colors: Vec<ColorIdentifier>,
}

impl ColorSet {
    /// Adds `color` unless its code is already present.
    pub(super) fn insert(&mut self, color: ColorIdentifier) -> bool {
        if !self.seen.insert(color.code().to_owned()) {
            return false;
        }
        self.colors.push(color);
        true
    }

    /// Adds every rule-set match in `text`, tagging each with `hex`.
    pub(super) fn insert_text_matches(&mut self, text: &str, hex: Option<&str>) {
        for m in match_all(text) {
            self.insert(ColorIdentifier::new(m.code, m.name).with_hex(hex));
        }
    }

    /// Adds the matches found in an element's flattened text, using the
    /// element's own swatch hex.
    pub(super) fn insert_scope(&mut self, el: ElementRef<'_>) {
        let hex = scope_hex(el);
        self.insert_text_matches(&flatten_text(el), hex.as_deref());
    }

    /// Adds colors declared through the `data-color` attribute on `el` or any
    /// of its descendants.
    pub(super) fn insert_attribute_colors(&mut self, el: ElementRef<'_>) {
        let own = el.value().attr(COLOR_ATTR).is_some().then_some(el);
        for holder in own.into_iter().chain(el.select(&COLOR_ATTR_ELEMENTS)) {
            if let Some(color) = attribute_color(holder) {
                self.insert(color);
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.colors.len()
    }

    pub(super) fn into_vec(self) -> Vec<ColorIdentifier> {
        self.colors
    }
}

/// All text under `el` with every whitespace run collapsed to one space.
pub(super) fn flatten_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Swatch hex for a scope: an inline-style hex on the element, then its
/// `data-hex` attribute, then the first inline-style hex on a descendant.
pub(super) fn scope_hex(el: ElementRef<'_>) -> Option<String> {
    if let Some(hex) = el.value().attr("style").and_then(style_hex) {
        return Some(hex);
    }
    if let Some(raw) = el.value().attr(HEX_ATTR).filter(|v| !v.trim().is_empty()) {
        return Some(raw.trim().to_owned());
    }
    el.select(&STYLED)
        .find_map(|child| child.value().attr("style").and_then(style_hex))
}

fn style_hex(style: &str) -> Option<String> {
    STYLE_HEX_RE
        .captures(style)
        .and_then(|c| c.get(1))
        .map(|m| format!("#{}", m.as_str()))
}

/// Parses the `data-color` identifier on `el`, pairing it with `data-hex`.
pub(super) fn attribute_color(el: ElementRef<'_>) -> Option<ColorIdentifier> {
    let info = el.value().attr(COLOR_ATTR)?;
    let m = first_match(info)?;
    let hex = el.value().attr(HEX_ATTR);
    Some(ColorIdentifier::new(m.code, m.name).with_hex(hex))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn flatten_collapses_whitespace_across_nodes() {
        let doc = Html::parse_fragment("<div id=x>PANTONE\n   19-4052 <b>TCX</b>\tClassic   Blue</div>");
        assert_eq!(
            flatten_text(first(&doc, "#x")),
            "PANTONE 19-4052 TCX Classic Blue"
        );
    }

    #[test]
    fn scope_hex_prefers_own_style_then_data_attr_then_children() {
        let doc = Html::parse_fragment(
            r##"<div id=a style="background:#0F4C81" data-hex="111111"></div>
                <div id=b data-hex="abcdef"><span style="color:#123456"></span></div>
                <div id=c><span style="color: #fff"></span></div>
                <div id=d></div>"##,
        );
        assert_eq!(scope_hex(first(&doc, "#a")).as_deref(), Some("#0F4C81"));
        assert_eq!(scope_hex(first(&doc, "#b")).as_deref(), Some("abcdef"));
        assert_eq!(scope_hex(first(&doc, "#c")).as_deref(), Some("#fff"));
        assert_eq!(scope_hex(first(&doc, "#d")), None);
    }

    #[test]
    fn attribute_color_reads_identifier_and_hex() {
        let doc = Html::parse_fragment(
            r#"<span id=s data-color="PANTONE 19-4052 Classic Blue" data-hex="0F4C81"></span>"#,
        );
        let color = attribute_color(first(&doc, "#s")).unwrap();
        assert_eq!(color.code(), "19-4052");
        assert_eq!(color.name(), "Classic Blue");
        assert_eq!(color.hex_value(), Some("#0F4C81"));
    }

    #[test]
    fn attribute_color_without_recognizable_identifier_is_none() {
        let doc = Html::parse_fragment(r#"<span id=s data-color="navy"></span>"#);
        assert!(attribute_color(first(&doc, "#s")).is_none());
    }

    #[test]
    fn color_set_keeps_first_code() {
        let mut set = ColorSet::default();
        assert!(set.insert(ColorIdentifier::new("19-4052", "Classic Blue")));
        assert!(!set.insert(ColorIdentifier::new("19-4052", "Other Name")));
        let colors = set.into_vec();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].name(), "Classic Blue");
    }
}
