//! Brand and color records produced by page extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brand name used when no heuristic yields one.
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

/// Prefix of the canonical color rendering, e.g. `PANTONE 19-4052 Classic Blue`.
const DISPLAY_PREFIX: &str = "PANTONE";

/// One recognized catalog color code.
///
/// Immutable once built; the display name and RGB triple are derived at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorIdentifier {
    #[serde(rename = "color_code")]
    code: String,
    #[serde(rename = "color_name")]
    name: String,
    #[serde(rename = "full_name")]
    display_name: String,
    hex_value: Option<String>,
    rgb: Option<[u8; 3]>,
}

impl ColorIdentifier {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let code = code.into();
        let name = name.into().trim().to_owned();
        let display_name = if name.is_empty() {
            format!("{DISPLAY_PREFIX} {code}")
        } else {
            format!("{DISPLAY_PREFIX} {code} {name}")
        };
        Self {
            code,
            name,
            display_name,
            hex_value: None,
            rgb: None,
        }
    }

    /// Attaches a hex value (with or without a leading `#`).
    ///
    /// The RGB triple is filled in when the value is a valid 3- or 6-digit hex.
    #[must_use]
    pub fn with_hex(mut self, hex: Option<&str>) -> Self {
        self.hex_value = hex.and_then(normalize_hex);
        self.rgb = self.hex_value.as_deref().and_then(hex_to_rgb);
        self
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn hex_value(&self) -> Option<&str> {
        self.hex_value.as_deref()
    }

    #[must_use]
    pub fn rgb(&self) -> Option<[u8; 3]> {
        self.rgb
    }
}

fn normalize_hex(raw: &str) -> Option<String> {
    let digits = raw.trim().trim_start_matches('#');
    if digits.is_empty() {
        return None;
    }
    Some(format!("#{digits}"))
}

fn hex_to_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim_start_matches('#');
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some([
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ]),
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(digits.chars()) {
                *slot = channel(&format!("{c}{c}"))?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// One discovered brand/media association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandRecord {
    brand_name: String,
    #[serde(rename = "image_url")]
    media_reference: String,
    #[serde(rename = "local_image_path")]
    local_path: Option<String>,
    colors: Vec<ColorIdentifier>,
    #[serde(rename = "page_url")]
    source_page: String,
    #[serde(rename = "scraped_at")]
    discovered_at: DateTime<Utc>,
}

impl BrandRecord {
    /// Builds a record stamped with the current time.
    ///
    /// A blank `brand_name` is replaced with [`UNKNOWN_BRAND`]. The caller is
    /// responsible for passing an absolute `media_reference`.
    #[must_use]
    pub fn new(
        brand_name: impl Into<String>,
        media_reference: impl Into<String>,
        source_page: impl Into<String>,
        colors: Vec<ColorIdentifier>,
    ) -> Self {
        let brand_name = brand_name.into();
        let brand_name = if brand_name.trim().is_empty() {
            UNKNOWN_BRAND.to_owned()
        } else {
            brand_name.trim().to_owned()
        };
        Self {
            brand_name,
            media_reference: media_reference.into(),
            local_path: None,
            colors,
            source_page: source_page.into(),
            discovered_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    #[must_use]
    pub fn media_reference(&self) -> &str {
        &self.media_reference
    }

    #[must_use]
    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    #[must_use]
    pub fn colors(&self) -> &[ColorIdentifier] {
        &self.colors
    }

    #[must_use]
    pub fn source_page(&self) -> &str {
        &self.source_page
    }

    #[must_use]
    pub fn discovered_at(&self) -> DateTime<Utc> {
        self.discovered_at
    }

    /// Records where the media was stored. Only the first call takes effect;
    /// returns `false` when a path was already attached.
    pub fn attach_local_path(&mut self, path: impl Into<String>) -> bool {
        if self.local_path.is_some() {
            return false;
        }
        self.local_path = Some(path.into());
        true
    }
}
