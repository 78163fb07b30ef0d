//! Listing attribute normalization
//!
//! A listing group carries a list of free-form attribute tags. The first tag
//! is the presentation format; the rest describe language, captioning and
//! discount-pass eligibility.

/// Canonical format labels keyed by lowercase raw tag
const FORMAT_TABLE: &[(&str, &str)] = &[
    ("dolby cinema @ amc", "Dolby"),
    ("reald 3d", "3D"),
    ("digital 3d", "3D"),
    ("acx", "Apple Cinemas Experience"),
    ("laser at amc", "Standard"),
];

/// Format used when a listing group has no attributes at all
pub const DEFAULT_FORMAT: &str = "Standard";

/// Attributes shared by every showing of one listing group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowingAttributes {
    pub format: String,
    pub languages: Vec<String>,
    pub is_open_caption: bool,
    pub no_pass: bool,
}

/// Map a raw format tag onto its canonical label
///
/// Unknown tags are returned unchanged, original casing included.
pub fn simplify_format(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    FORMAT_TABLE
        .iter()
        .find(|(key, _)| *key == lowered)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Normalize the attribute tags of one listing group
pub fn normalize_attributes<S: AsRef<str>>(attributes: &[S]) -> ShowingAttributes {
    let format = attributes
        .first()
        .map(|primary| simplify_format(primary.as_ref()))
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    let lowered: Vec<String> = attributes
        .iter()
        .map(|attr| attr.as_ref().to_lowercase())
        .collect();

    // "Spanish Language" -> "spanish"
    let languages = lowered
        .iter()
        .filter(|attr| attr.ends_with("language"))
        .filter_map(|attr| {
            attr.trim_end()
                .rsplit_once(char::is_whitespace)
                .map(|(name, _)| name.trim_end().to_string())
        })
        .collect();

    let is_open_caption = lowered.iter().any(|attr| attr == "open caption");
    let no_pass = lowered
        .iter()
        .any(|attr| attr == "alternative content" || attr == "no passes");

    ShowingAttributes {
        format,
        languages,
        is_open_caption,
        no_pass,
    }
}

/// Strip a trailing `(YYYY)` release year from a listing title
///
/// Only a parenthesized, all-digit final token is removed; anything else
/// (including titles that merely contain a year) is kept verbatim.
pub fn strip_release_year(title: &str) -> String {
    let trimmed = title.trim_end();
    let Some((name, last)) = trimmed.rsplit_once(char::is_whitespace) else {
        return title.to_string();
    };

    let is_year = last.len() > 2
        && last.starts_with('(')
        && last.ends_with(')')
        && last[1..last.len() - 1].chars().all(|c| c.is_ascii_digit());

    if is_year {
        name.trim_end().to_string()
    } else {
        title.to_string()
    }
}
