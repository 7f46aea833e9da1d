//! Brand role selection
//!
//! Turns ranked candidates into the four brand roles, falling back to fixed
//! defaults when data is missing.

use super::{
    contrast_ratio, is_hex_color, most_common, rank, RankedColors, DEFAULT_BACKGROUND,
    DEFAULT_LINK, DEFAULT_PRIMARY, DEFAULT_SECONDARY, MIN_SECONDARY_CONTRAST,
};
use crate::types::{BrandColorSet, ColorCategory, ColorObservation};
use tracing::debug;

/// Secondary color used when the ranked secondary is illegible
const LEGIBLE_SECONDARY: &str = "#333333";
/// Replacement when the background itself is the legible secondary
const LEGIBLE_SECONDARY_ON_DARK: &str = "#FFFFFF";

/// Select the four brand roles from ranked colors
///
/// - background: most common background color (white/black skipped), else white
/// - link: most common link color (white/black skipped), else `#0066CC`
/// - primary / secondary: first two ranked candidates, else `#333333` / `#666666`
///
/// A secondary with contrast below 3.0 against the background is replaced by
/// `#333333`, or `#FFFFFF` when the background is `#333333`.
///
/// Always returns four valid `#RRGGBB` strings.
pub fn select_roles(ranked: &RankedColors) -> BrandColorSet {
    let background = valid_or(
        most_common(ranked.categories.get(ColorCategory::Background), DEFAULT_BACKGROUND),
        DEFAULT_BACKGROUND,
    );
    let link = valid_or(
        most_common(ranked.categories.get(ColorCategory::Link), DEFAULT_LINK),
        DEFAULT_LINK,
    );

    let primary = valid_or(
        ranked
            .most_common
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_PRIMARY.to_string()),
        DEFAULT_PRIMARY,
    );
    let mut secondary = ranked
        .most_common
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SECONDARY.to_string());

    let contrast = contrast_ratio(&secondary, &background);
    if contrast < MIN_SECONDARY_CONTRAST {
        let replacement = if background != LEGIBLE_SECONDARY {
            LEGIBLE_SECONDARY
        } else {
            LEGIBLE_SECONDARY_ON_DARK
        };
        debug!(
            secondary = %secondary,
            background = %background,
            contrast,
            replacement,
            "Secondary color illegible on background, overriding"
        );
        secondary = replacement.to_string();
    }

    BrandColorSet {
        primary_color: primary,
        secondary_color: secondary,
        background_color: background,
        link_color: link,
    }
}

/// Rank observations and select roles in one step
pub fn analyze_colors(observations: &[ColorObservation]) -> BrandColorSet {
    select_roles(&rank(observations))
}

// Malformed `#` pass-through values must not leak into the result
fn valid_or(color: String, default: &str) -> String {
    if is_hex_color(&color) {
        color
    } else {
        default.to_string()
    }
}
