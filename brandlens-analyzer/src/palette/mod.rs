//! Deterministic brand color aggregation
//!
//! Pure pipeline used by the DOM statistical strategy:
//!
//! ```text
//! raw color strings ──normalize──> #RRGGBB ──rank──> RankedColors
//!                                                      │
//!                         contrast_ratio ◄── select_roles ──> BrandColorSet
//! ```
//!
//! Nothing in this module performs I/O or returns an error: unparseable input
//! is skipped and insufficient data resolves to the fallback constants below.

mod contrast;
mod named;
mod normalizer;
mod ranker;
mod roles;

pub use contrast::{
    contrast_ratio, is_hex_color, is_legible, parse_hex_rgb, relative_luminance,
    MIN_SECONDARY_CONTRAST,
};
pub use named::named_color;
pub use normalizer::normalize;
pub use ranker::{
    most_common, rank, CategoryLists, RankedColors, EXCLUDED_FROM_RANKING, MAX_RANKED_COLORS,
};
pub use roles::{analyze_colors, select_roles};

/// Fallback primary color
pub const DEFAULT_PRIMARY: &str = "#333333";
/// Fallback secondary (text) color
pub const DEFAULT_SECONDARY: &str = "#666666";
/// Fallback background color
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
/// Fallback link color
pub const DEFAULT_LINK: &str = "#0066CC";
