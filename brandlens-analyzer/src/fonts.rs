//! Font family classification
//!
//! Picks the two most brand-specific font families from the raw list of
//! computed `font-family` names: custom/web fonts first, common system fonts
//! only when no custom font exists, generic keywords never.

use crate::types::FontSelection;
use serde_json::Value;

/// Generic CSS font keywords (compared case-insensitively)
const GENERIC_FONTS: &[&str] = &["serif", "sans-serif", "monospace", "cursive", "fantasy", "system-ui"];

/// Common system font families (compared case-sensitively)
const SYSTEM_FONTS: &[&str] = &[
    "Arial",
    "Helvetica",
    "Times",
    "Courier",
    "Verdana",
    "Georgia",
    "Palatino",
    "Garamond",
    "Bookman",
    "Comic Sans MS",
    "Trebuchet MS",
    "Arial Black",
    "Impact",
];

/// Padding applied when fewer than two fonts were selected
const PADDING_FONTS: &[&str] = &["Helvetica", "Arial", "sans-serif"];

/// Tokens the browser reports that are not font names
const NON_FONT_TOKENS: &[&str] = &["inherit", "initial"];

/// Whether `font` is a generic CSS family keyword
pub fn is_generic(font: &str) -> bool {
    let lower = font.to_lowercase();
    GENERIC_FONTS.contains(&lower.as_str())
}

/// Whether `font` is one of the common system families
pub fn is_system(font: &str) -> bool {
    SYSTEM_FONTS.contains(&font)
}

/// Select exactly two font names from raw font-family observations
///
/// # Examples
/// ```
/// use brandlens_analyzer::fonts::classify;
///
/// let fonts = ["Inter", "Arial", "sans-serif", "Arial"].map(String::from);
/// let selection = classify(&fonts);
/// assert_eq!(selection.as_slice(), ["Inter", "Helvetica"]);
/// ```
pub fn classify<S: AsRef<str>>(raw_fonts: &[S]) -> FontSelection {
    let mut custom: Vec<&str> = Vec::new();
    let mut fallback: Vec<&str> = Vec::new();

    for font in raw_fonts {
        let font = font.as_ref();
        if font.is_empty() || is_generic(font) {
            continue;
        }

        let bucket = if is_system(font) {
            &mut fallback
        } else {
            &mut custom
        };
        if !bucket.contains(&font) {
            bucket.push(font);
        }
    }

    let source = if custom.is_empty() { &fallback } else { &custom };

    let mut selected = source
        .iter()
        .copied()
        .chain(PADDING_FONTS.iter().copied())
        .take(2);

    match (selected.next(), selected.next()) {
        (Some(first), Some(second)) => FontSelection::new(first, second),
        _ => FontSelection::fallback(),
    }
}

/// Classify the raw JSON returned by the browser-side font scan
///
/// Anything other than an array of strings yields the fallback selection.
pub fn classify_value(value: &Value) -> FontSelection {
    let Some(items) = value.as_array() else {
        return FontSelection::fallback();
    };

    let fonts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
    match fonts {
        Some(fonts) => classify(&fonts),
        None => FontSelection::fallback(),
    }
}

/// Split a computed `font-family` chain into individual family names
///
/// Quotes are stripped; empty, `inherit` and `initial` tokens are dropped.
pub fn split_font_family(css_value: &str) -> Vec<String> {
    css_value
        .split(',')
        .map(|token| token.trim().replace(['"', '\''], ""))
        .filter(|token| {
            !token.is_empty() && !NON_FONT_TOKENS.iter().any(|skip| token.contains(skip))
        })
        .collect()
}
