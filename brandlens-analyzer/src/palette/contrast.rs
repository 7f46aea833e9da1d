//! WCAG relative luminance and contrast ratio

/// Minimum contrast between the secondary (text) color and the background
pub const MIN_SECONDARY_CONTRAST: f64 = 3.0;

/// Parse `#RRGGBB` (case-insensitive) into channels
///
/// Leading `#` characters are optional; anything other than exactly six hex
/// digits after them is rejected.
pub fn parse_hex_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Whether `s` is a canonical normalized color: `#` + 6 uppercase hex digits
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}

// sRGB -> linear light, WCAG 2.x threshold
fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance (0.0 for black, 1.0 for white)
pub fn relative_luminance(hex: &str) -> Option<f64> {
    let [r, g, b] = parse_hex_rgb(hex)?;
    Some(0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b))
}

/// WCAG contrast ratio between two hex colors, in [1.0, 21.0]
///
/// Malformed input yields 1.0 ("no contrast").
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    let (Some(l1), Some(l2)) = (relative_luminance(a), relative_luminance(b)) else {
        return 1.0;
    };

    let lighter = l1.max(l2);
    let darker = l1.min(l2);

    (lighter + 0.05) / (darker + 0.05)
}

/// Whether `text` is legible on `background` (contrast >= 3.0)
pub fn is_legible(text: &str, background: &str) -> bool {
    contrast_ratio(text, background) >= MIN_SECONDARY_CONTRAST
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_same_color_has_no_contrast() {
        for hex in ["#000000", "#FFFFFF", "#0066CC", "#FF5733", "#333333"] {
            assert!((contrast_ratio(hex, hex) - 1.0).abs() < EPSILON, "{}", hex);
        }
    }

    #[test]
    fn test_black_white_is_maximum() {
        assert!((contrast_ratio("#FFFFFF", "#000000") - 21.0).abs() < EPSILON);
    }

    #[test]
    fn test_contrast_is_symmetric() {
        let pairs = [("#0000FF", "#FFFFFF"), ("#FF0000", "#333333"), ("#0066CC", "#F5F5F5")];
        for (a, b) in pairs {
            assert!((contrast_ratio(a, b) - contrast_ratio(b, a)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_known_ratios() {
        // Pure blue on white
        assert!((contrast_ratio("#0000FF", "#FFFFFF") - 8.59).abs() < 0.01);
        // Default secondary on default background
        assert!((contrast_ratio("#666666", "#FFFFFF") - 5.74).abs() < 0.01);
    }

    #[test]
    fn test_malformed_input_is_neutral() {
        assert_eq!(contrast_ratio("#FFF", "#000000"), 1.0);
        assert_eq!(contrast_ratio("#GGGGGG", "#000000"), 1.0);
        assert_eq!(contrast_ratio("", ""), 1.0);
        assert_eq!(contrast_ratio("#FFFFFF", "#TRANSPARENT"), 1.0);
    }

    #[test]
    fn test_case_insensitive_parse() {
        assert_eq!(parse_hex_rgb("#ff8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_rgb("FF8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_rgb("#FF80001"), None);
    }

    #[test]
    fn test_hex_color_shape() {
        assert!(is_hex_color("#0066CC"));
        assert!(!is_hex_color("#0066cc"));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("0066CC0"));
        assert!(!is_hex_color("#TRANSP"));
    }

    #[test]
    fn test_legibility_threshold() {
        assert!(is_legible("#000000", "#FFFFFF"));
        assert!(!is_legible("#EEEEEE", "#FFFFFF"));
    }

    #[test]
    fn test_luminance_bounds() {
        assert_eq!(relative_luminance("#000000"), Some(0.0));
        assert!((relative_luminance("#FFFFFF").unwrap() - 1.0).abs() < EPSILON);
        assert_eq!(relative_luminance("nope"), None);
    }
}
