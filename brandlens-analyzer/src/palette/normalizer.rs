//! Color string normalization
//!
//! Converts computed-style color strings into `#RRGGBB`.

use super::named::named_color;

/// Normalize a raw color string to uppercase `#RRGGBB`
///
/// - `#...` is uppercased and passed through as-is (no length check)
/// - `rgb(...)` / `rgba(...)` uses the first three integer runs, alpha ignored
/// - anything else goes through the CSS named color table
///
/// Returns `None` for input that cannot be interpreted (`transparent`,
/// `inherit`, an `rgb()` with fewer than three numbers, ...). Callers skip
/// those observations.
///
/// # Examples
/// ```
/// use brandlens_analyzer::palette::normalize;
///
/// assert_eq!(normalize("rgb(255, 0, 0)").as_deref(), Some("#FF0000"));
/// assert_eq!(normalize("rgba(0, 102, 204, 0.5)").as_deref(), Some("#0066CC"));
/// assert_eq!(normalize("#abcdef").as_deref(), Some("#ABCDEF"));
/// assert_eq!(normalize("navy").as_deref(), Some("#000080"));
/// assert_eq!(normalize("transparent"), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    let color = raw.trim();

    if color.starts_with('#') {
        return Some(color.to_ascii_uppercase());
    }

    if color.starts_with("rgb") {
        let channels: Vec<u64> = integer_runs(color)
            .take(3)
            .filter_map(|run| run.parse().ok())
            .collect();

        return match channels.as_slice() {
            [r, g, b] => Some(format!("#{:02X}{:02X}{:02X}", r, g, b)),
            _ => None,
        };
    }

    named_color(color).map(str::to_string)
}

/// Maximal runs of ASCII digits, in order of appearance
fn integer_runs(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}
