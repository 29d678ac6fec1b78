//! Pattern families that recognize catalog color identifiers in free text.
//!
//! Three surface orderings are recognized, tried in this priority order:
//!
//! 1. `PANTONE 19-4052 TCX Classic Blue` (code, catalog qualifier, name)
//! 2. `PANTONE 19-4052 Classic Blue` (code, name)
//! 3. `PANTONE Classic Blue 19-4052` (name, code)
//!
//! The label is matched case-insensitively. Names are one or two capitalized
//! words (`[A-Z][a-z]+`); anything else is not recognized.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static CODE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{4}$").expect("valid code regex"));

static FAMILIES: LazyLock<[PatternFamily; 3]> = LazyLock::new(|| {
    [
        PatternFamily::new(
            r"(?i:PANTONE)\s+(\d{2}-\d{4})\s*(?i:TCX|TPX|TPG|C|U)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
            false,
        ),
        PatternFamily::new(
            r"(?i:PANTONE)\s+(\d{2}-\d{4})\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
            false,
        ),
        // A digit right after the code means it belongs to a longer numeric run.
        PatternFamily::new(
            r"(?i:PANTONE)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\s+(\d{2}-\d{4})",
            true,
        ),
    ]
});

struct PatternFamily {
    regex: Regex,
    reject_trailing_digit: bool,
}

impl PatternFamily {
    fn new(pattern: &str, reject_trailing_digit: bool) -> Self {
        Self {
            regex: Regex::new(pattern).expect("valid color pattern"),
            reject_trailing_digit,
        }
    }

    /// Returns the two captured groups of every non-overlapping match, in
    /// capture order.
    fn captures<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        let mut out = Vec::new();
        let mut pos = 0usize;

        while let Some(caps) = self.regex.captures_at(text, pos) {
            let Some(whole) = caps.get(0) else {
                break;
            };

            if self.reject_trailing_digit
                && text[whole.end()..].chars().next().is_some_and(char::is_numeric)
            {
                // Retry from the next char so a later label can still match.
                pos = whole.start()
                    + text[whole.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                continue;
            }

            if let (Some(a), Some(b)) = (caps.get(1), caps.get(2)) {
                out.push((a.as_str(), b.as_str()));
            }
            pos = whole.end().max(pos + 1);
            if pos > text.len() {
                break;
            }
        }

        out
    }
}

/// A recognized `(code, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMatch {
    pub code: String,
    pub name: String,
}

impl ColorMatch {
    /// Assigns code and name from two captured groups whose order depends on
    /// the pattern family. Whichever group has the code shape is the code.
    fn from_groups(a: &str, b: &str) -> Option<Self> {
        let (code, name) = if is_color_code(a) {
            (a, b)
        } else if is_color_code(b) {
            (b, a)
        } else {
            return None;
        };
        Some(Self {
            code: code.to_owned(),
            name: name.trim().to_owned(),
        })
    }
}

/// `true` if `s` is exactly two digits, a hyphen, and four digits.
#[must_use]
pub fn is_color_code(s: &str) -> bool {
    CODE_SHAPE_RE.is_match(s)
}

/// Runs every pattern family over `text` in priority order.
///
/// Results are deduplicated by code: the first family to produce a code wins
/// and later matches of the same code are discarded. Order is discovery order.
#[must_use]
pub fn match_all(text: &str) -> Vec<ColorMatch> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for family in FAMILIES.iter() {
        for (a, b) in family.captures(text) {
            let Some(m) = ColorMatch::from_groups(a, b) else {
                continue;
            };
            if seen.insert(m.code.clone()) {
                out.push(m);
            }
        }
    }

    out
}

/// The highest-priority match in `text`, if any.
#[must_use]
pub fn first_match(text: &str) -> Option<ColorMatch> {
    match_all(text).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        match_all(text)
            .into_iter()
            .map(|m| (m.code, m.name))
            .collect()
    }

    #[test]
    fn qualifier_form_yields_single_pair() {
        assert_eq!(
            pairs("Spring palette: PANTONE 19-4052 TCX Classic Blue, shown left."),
            vec![("19-4052".to_string(), "Classic Blue".to_string())]
        );
    }

    #[test]
    fn every_qualifier_is_accepted() {
        for q in ["TCX", "TPX", "TPG", "C", "U"] {
            let text = format!("PANTONE 17-1230 {q} Mocha Mousse");
            assert_eq!(
                pairs(&text),
                vec![("17-1230".to_string(), "Mocha Mousse".to_string())],
                "qualifier {q}"
            );
        }
    }

    #[test]
    fn plain_form_matches() {
        assert_eq!(
            pairs("PANTONE 13-1520 Rose Quartz"),
            vec![("13-1520".to_string(), "Rose Quartz".to_string())]
        );
    }

    #[test]
    fn name_first_form_assigns_code_by_shape() {
        assert_eq!(
            pairs("PANTONE Classic Blue 19-4052"),
            vec![("19-4052".to_string(), "Classic Blue".to_string())]
        );
    }

    #[test]
    fn same_code_in_two_orderings_keeps_earlier_family() {
        let text = "PANTONE Serenity Sky 19-4052 and later PANTONE 19-4052 Classic Blue";
        assert_eq!(
            pairs(text),
            vec![("19-4052".to_string(), "Classic Blue".to_string())]
        );
    }

    #[test]
    fn label_is_case_insensitive() {
        assert_eq!(
            pairs("pantone 15-0343 Greenery"),
            vec![("15-0343".to_string(), "Greenery".to_string())]
        );
    }

    #[test]
    fn lowercase_names_are_not_recognized() {
        assert!(pairs("PANTONE 19-4052 classic blue").is_empty());
    }

    #[test]
    fn name_first_rejects_longer_numeric_run() {
        assert!(pairs("PANTONE Classic Blue 19-40521").is_empty());
    }

    #[test]
    fn multiple_codes_keep_discovery_order() {
        let text = "PANTONE 19-4052 TCX Classic Blue PANTONE 13-1520 Rose Quartz PANTONE Greenery 15-0343";
        let codes: Vec<String> = match_all(text).into_iter().map(|m| m.code).collect();
        assert_eq!(codes, vec!["19-4052", "13-1520", "15-0343"]);
    }

    #[test]
    fn from_groups_rejects_when_neither_is_a_code() {
        assert!(ColorMatch::from_groups("Blue", "Sky").is_none());
    }

    #[test]
    fn code_shape_is_exact() {
        assert!(is_color_code("19-4052"));
        assert!(!is_color_code("19-40521"));
        assert!(!is_color_code("194052"));
        assert!(!is_color_code("1-4052"));
    }

    #[test]
    fn first_match_prefers_qualifier_family() {
        let m = first_match("PANTONE 18-1750 Viva Magenta / PANTONE 19-4052 TCX Classic Blue").unwrap();
        assert_eq!(m.code, "19-4052");
    }
}
