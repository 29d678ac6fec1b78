//! Local file naming for downloaded media.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use reqwest::Url;
use sha2::{Digest, Sha256};

/// Characters that are illegal in file names on at least one common platform.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Extension given to synthesized names.
const FALLBACK_EXTENSION: &str = "jpg";

/// Hex digits of the URL hash used in synthesized names.
const HASH_PREFIX_LEN: usize = 12;

/// Derives a safe local file name from a media URL.
///
/// The last percent-decoded path segment is used when it looks like a file
/// name (non-empty and containing a dot). Otherwise a deterministic
/// `image_<hash>.jpg` name is built from the full URL.
#[must_use]
pub fn resolve_filename(url: &str) -> String {
    let segment = last_path_segment(url);
    let name = if segment.is_empty() || !segment.contains('.') {
        format!("image_{}.{FALLBACK_EXTENSION}", short_hash(url))
    } else {
        segment
    };
    sanitize(&name)
}

/// Returns `dir/name` if nothing exists there, otherwise the first free
/// `stem_N.ext` for `N = 1, 2, ...`.
#[must_use]
pub fn resolve_unique_path(dir: &Path, name: &str) -> PathBuf {
    resolve_unique_path_with(dir, name, |p| p.exists())
}

/// [`resolve_unique_path`] with a caller-supplied notion of "taken", so paths
/// reserved by in-flight downloads can be skipped too.
pub(crate) fn resolve_unique_path_with(
    dir: &Path,
    name: &str,
    mut is_taken: impl FnMut(&Path) -> bool,
) -> PathBuf {
    let candidate = dir.join(name);
    if !is_taken(&candidate) {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map_or_else(|| name.to_owned(), |s| s.to_string_lossy().into_owned());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u64..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|p| !is_taken(p))
        .unwrap_or(candidate)
}

fn last_path_segment(url: &str) -> String {
    let raw_path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_owned(),
    };
    let decoded = percent_decode_str(&raw_path).decode_utf8_lossy();
    decoded.rsplit('/').next().unwrap_or_default().to_owned()
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(HASH_PREFIX_LEN);
    for byte in digest.iter().take(HASH_PREFIX_LEN / 2) {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
