use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Normalize extracted span text.
///
/// Applies NFC, turns word joiners, newlines, no-break spaces and tabs into
/// plain spaces, collapses runs of spaces and trims the result.
pub fn normalize_text(text: &str) -> String {
    let composed: String = text
        .nfc()
        .map(|c| match c {
            '\u{2060}' | '\n' | '\u{00A0}' | '\t' => ' ',
            other => other,
        })
        .collect();

    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r"[ ]{2,}").unwrap());
    re_spaces.replace_all(&composed, " ").trim().to_string()
}
