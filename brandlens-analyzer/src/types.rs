//! Core types for brandlens-analyzer
//!
//! Shared data model for the color/font aggregation core and the extraction
//! strategies built around it:
//! - Raw signals as delivered by the rendering collaborator
//! - The four-role brand color set and the two-font selection
//! - The uniform `ExtractionResult` report returned to callers

use crate::palette::{DEFAULT_BACKGROUND, DEFAULT_LINK, DEFAULT_PRIMARY, DEFAULT_SECONDARY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Raw Signals
// ============================================================================

/// Which computed-style property a color observation was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCategory {
    Text,
    Background,
    Border,
    Link,
}

/// A raw color string tagged with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorObservation {
    pub raw: String,
    pub category: ColorCategory,
}

impl ColorObservation {
    pub fn new(raw: impl Into<String>, category: ColorCategory) -> Self {
        Self {
            raw: raw.into(),
            category,
        }
    }
}

/// Color lists collected by the browser-side color scan
///
/// Field names match the JSON object returned by the scan script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorSignal {
    pub text_colors: Vec<String>,
    pub background_colors: Vec<String>,
    pub border_colors: Vec<String>,
    pub link_colors: Vec<String>,
}

impl ColorSignal {
    /// Canned signal used when the color scan itself fails
    pub fn fallback() -> Self {
        Self {
            text_colors: vec!["rgb(51, 51, 51)".to_string()],
            background_colors: vec!["rgb(255, 255, 255)".to_string()],
            border_colors: Vec::new(),
            link_colors: vec!["rgb(0, 102, 204)".to_string()],
        }
    }

    /// Flatten into tagged observations (text, background, border, link order)
    pub fn observations(&self) -> Vec<ColorObservation> {
        let tagged = [
            (&self.text_colors, ColorCategory::Text),
            (&self.background_colors, ColorCategory::Background),
            (&self.border_colors, ColorCategory::Border),
            (&self.link_colors, ColorCategory::Link),
        ];

        tagged
            .into_iter()
            .flat_map(|(colors, category)| {
                colors
                    .iter()
                    .map(move |raw| ColorObservation::new(raw.clone(), category))
            })
            .collect()
    }

    /// Total number of raw color strings across all categories
    pub fn total(&self) -> usize {
        self.text_colors.len()
            + self.background_colors.len()
            + self.border_colors.len()
            + self.link_colors.len()
    }
}

// ============================================================================
// Brand Decision
// ============================================================================

/// The four brand color roles, each a `#RRGGBB` string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandColorSet {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub link_color: String,
}

impl BrandColorSet {
    /// Universal fallback used whenever a strategy cannot decide
    pub fn fallback() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY.to_string(),
            secondary_color: DEFAULT_SECONDARY.to_string(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            link_color: DEFAULT_LINK.to_string(),
        }
    }
}

impl Default for BrandColorSet {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Exactly two font family names, most brand-specific first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSelection([String; 2]);

impl FontSelection {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self([first.into(), second.into()])
    }

    /// Fallback selection used when font signals are unusable
    pub fn fallback() -> Self {
        Self::new("Arial", "sans-serif")
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn second(&self) -> &str {
        &self.0[1]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for FontSelection {
    fn default() -> Self {
        Self::fallback()
    }
}

// ============================================================================
// Extraction Strategies
// ============================================================================

/// Available extraction strategies
///
/// Wire names accept the legacy aliases (`dom_naive`, `css_llm`,
/// `screenshot_direct`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Statistical analysis of computed DOM styles (no model involved)
    #[default]
    #[serde(alias = "dom_naive")]
    DomStatistical,
    /// Stylesheet rules and computed styles summarised for a language model
    #[serde(alias = "css_llm")]
    CssModel,
    /// Raw screenshot judged by a vision model
    #[serde(alias = "screenshot_direct")]
    ScreenshotModel,
    /// Screenshot plus quantized palette legend judged by a vision model
    ScreenshotPalette,
}

impl ExtractionMethod {
    pub const ALL: [ExtractionMethod; 4] = [
        ExtractionMethod::DomStatistical,
        ExtractionMethod::CssModel,
        ExtractionMethod::ScreenshotModel,
        ExtractionMethod::ScreenshotPalette,
    ];

    /// Wire name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::DomStatistical => "dom_statistical",
            ExtractionMethod::CssModel => "css_model",
            ExtractionMethod::ScreenshotModel => "screenshot_model",
            ExtractionMethod::ScreenshotPalette => "screenshot_palette",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dom_statistical" | "dom_naive" => Ok(ExtractionMethod::DomStatistical),
            "css_model" | "css_llm" => Ok(ExtractionMethod::CssModel),
            "screenshot_model" | "screenshot_direct" => Ok(ExtractionMethod::ScreenshotModel),
            "screenshot_palette" => Ok(ExtractionMethod::ScreenshotPalette),
            other => Err(format!("Unknown extraction method: {}", other)),
        }
    }
}

/// Per-request rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Capture the whole document rather than the viewport
    pub full_page: bool,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// CSS selector to wait for after navigation
    pub wait_for_selector: Option<String>,
    /// Palette size for the screenshot palette strategy
    pub num_colors: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            full_page: true,
            quality: 90,
            wait_for_selector: None,
            num_colors: 10,
        }
    }
}

// ============================================================================
// Extraction Report
// ============================================================================

/// Uniform report produced by every strategy
///
/// Serializes with the color roles flattened next to `fonts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fonts: FontSelection,
    #[serde(flatten)]
    pub colors: BrandColorSet,
    pub success: bool,
    pub message: String,
    pub method: String,
    pub metadata: Option<Map<String, Value>>,
}

impl ExtractionResult {
    /// Successful report
    pub fn success(
        method: ExtractionMethod,
        colors: BrandColorSet,
        fonts: FontSelection,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            fonts,
            colors,
            success: true,
            message: format!("Brand extraction completed successfully using {}", method),
            method: method.as_str().to_string(),
            metadata,
        }
    }

    /// Failure report carrying the universal fallback palette and fonts
    pub fn failure(
        method: ExtractionMethod,
        error_message: impl fmt::Display,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            fonts: FontSelection::fallback(),
            colors: BrandColorSet::fallback(),
            success: false,
            message: format!("{} failed: {}", method, error_message),
            method: method.as_str().to_string(),
            metadata,
        }
    }
}

/// Extraction error
///
/// Raised inside strategies; never escapes `Extractor::extract`, which turns
/// it into a failure report.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Browser session could not be opened or a command failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// Page navigation failed
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Browser-side script failed or returned an unexpected shape
    #[error("Script error: {0}")]
    Script(String),

    /// Screenshot capture or decoding failed
    #[error("Screenshot error: {0}")]
    Screenshot(String),

    /// Color-judging model call failed
    #[error("Model error: {0}")]
    Judge(String),

    /// Image processing failed
    #[error("Image error: {0}")]
    Image(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_wire_names_and_aliases() {
        let parsed: ExtractionMethod = serde_json::from_value(json!("dom_naive")).unwrap();
        assert_eq!(parsed, ExtractionMethod::DomStatistical);

        let parsed: ExtractionMethod = serde_json::from_value(json!("css_llm")).unwrap();
        assert_eq!(parsed, ExtractionMethod::CssModel);

        let parsed: ExtractionMethod = serde_json::from_value(json!("screenshot_direct")).unwrap();
        assert_eq!(parsed, ExtractionMethod::ScreenshotModel);

        for method in ExtractionMethod::ALL {
            assert_eq!(serde_json::to_value(method).unwrap(), json!(method.as_str()));
            assert_eq!(method.as_str().parse::<ExtractionMethod>().unwrap(), method);
        }

        assert!("vibes".parse::<ExtractionMethod>().is_err());
    }

    #[test]
    fn test_observations_keep_category_order() {
        let signal = ColorSignal {
            text_colors: vec!["red".into()],
            background_colors: vec!["white".into()],
            border_colors: vec!["gray".into()],
            link_colors: vec!["blue".into()],
        };

        let categories: Vec<_> = signal.observations().iter().map(|o| o.category).collect();
        assert_eq!(
            categories,
            vec![
                ColorCategory::Text,
                ColorCategory::Background,
                ColorCategory::Border,
                ColorCategory::Link
            ]
        );
        assert_eq!(signal.total(), 4);
    }

    #[test]
    fn test_result_serializes_flat_colors() {
        let result = ExtractionResult::success(
            ExtractionMethod::DomStatistical,
            BrandColorSet::fallback(),
            FontSelection::new("Inter", "Arial"),
            None,
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["fonts"], json!(["Inter", "Arial"]));
        assert_eq!(value["primaryColor"], "#333333");
        assert_eq!(value["linkColor"], "#0066CC");
        assert_eq!(value["method"], "dom_statistical");
        assert_eq!(value["success"], true);
        assert_eq!(
            value["message"],
            "Brand extraction completed successfully using dom_statistical"
        );
    }

    #[test]
    fn test_failure_uses_fallback_tuple() {
        let result = ExtractionResult::failure(ExtractionMethod::CssModel, "boom", None);

        assert!(!result.success);
        assert_eq!(result.fonts, FontSelection::new("Arial", "sans-serif"));
        assert_eq!(result.colors, BrandColorSet::fallback());
        assert_eq!(result.message, "css_model failed: boom");
    }
}
