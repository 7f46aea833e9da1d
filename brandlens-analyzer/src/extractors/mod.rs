//! Brand extraction strategies
//!
//! Four interchangeable strategies produce the same [`ExtractionResult`]:
//!
//! 1. **dom_statistical** - computed styles of every element, decided by the
//!    deterministic palette core
//! 2. **css_model** - stylesheet rules, inline colors and key element styles
//!    summarised for the color judge
//! 3. **screenshot_model** - JPEG screenshot judged directly
//! 4. **screenshot_palette** - screenshot plus a quantized palette legend
//!
//! # Failure isolation
//! Strategies never return errors to callers. Individual signals degrade to
//! fallbacks (see [`signals`]); anything that stops a strategy outright turns
//! into a failure report with the universal fallback palette and fonts.

pub mod css_model;
pub mod dom_statistical;
pub mod prompts;
pub mod screenshot_model;
pub mod screenshot_palette;
pub mod signals;

pub use css_model::CssModel;
pub use dom_statistical::DomStatistical;
pub use screenshot_model::ScreenshotModel;
pub use screenshot_palette::ScreenshotPalette;

use crate::services::{BrowserLauncher, BrowserSession, ColorJudge, JudgeRequest, Viewport};
use crate::types::{AnalyzeOptions, BrandColorSet, ExtractionError, ExtractionMethod, ExtractionResult};
use brandlens_common::config::NavigationTimeouts;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// One configured strategy
pub enum Extractor {
    DomStatistical(DomStatistical),
    CssModel(CssModel),
    ScreenshotModel(ScreenshotModel),
    ScreenshotPalette(ScreenshotPalette),
}

impl Extractor {
    /// Build the strategy for `method` on top of the shared collaborators
    pub fn new(
        method: ExtractionMethod,
        launcher: Arc<dyn BrowserLauncher>,
        judge: Arc<dyn ColorJudge>,
        timeouts: &NavigationTimeouts,
    ) -> Self {
        let ms = Duration::from_millis;
        match method {
            ExtractionMethod::DomStatistical => {
                Extractor::DomStatistical(DomStatistical::new(launcher, ms(timeouts.dom_statistical_ms)))
            }
            ExtractionMethod::CssModel => {
                Extractor::CssModel(CssModel::new(launcher, judge, ms(timeouts.css_model_ms)))
            }
            ExtractionMethod::ScreenshotModel => Extractor::ScreenshotModel(ScreenshotModel::new(
                launcher,
                judge,
                ms(timeouts.screenshot_model_ms),
            )),
            ExtractionMethod::ScreenshotPalette => Extractor::ScreenshotPalette(
                ScreenshotPalette::new(launcher, judge, ms(timeouts.screenshot_palette_ms)),
            ),
        }
    }

    pub fn method(&self) -> ExtractionMethod {
        match self {
            Extractor::DomStatistical(_) => ExtractionMethod::DomStatistical,
            Extractor::CssModel(_) => ExtractionMethod::CssModel,
            Extractor::ScreenshotModel(_) => ExtractionMethod::ScreenshotModel,
            Extractor::ScreenshotPalette(_) => ExtractionMethod::ScreenshotPalette,
        }
    }

    /// Run the strategy against `url`
    ///
    /// Always returns a report; `success` tells whether the strategy finished.
    pub async fn extract(&self, url: &str, options: &AnalyzeOptions) -> ExtractionResult {
        match self {
            Extractor::DomStatistical(strategy) => strategy.extract(url, options).await,
            Extractor::CssModel(strategy) => strategy.extract(url, options).await,
            Extractor::ScreenshotModel(strategy) => strategy.extract(url, options).await,
            Extractor::ScreenshotPalette(strategy) => strategy.extract(url, options).await,
        }
    }
}

// ============================================================================
// Shared strategy steps
// ============================================================================

fn viewport(options: &AnalyzeOptions) -> Viewport {
    Viewport {
        width: options.viewport_width,
        height: options.viewport_height,
    }
}

/// Open a session sized to the requested viewport
async fn open_session(
    launcher: &dyn BrowserLauncher,
    options: &AnalyzeOptions,
) -> Result<BrowserSession, ExtractionError> {
    BrowserSession::open(launcher, viewport(options)).await
}

/// Wait for the optional selector; a miss is logged, never fatal
///
/// Returns the time spent waiting when a selector was requested.
async fn wait_for_selector(
    session: &mut BrowserSession,
    options: &AnalyzeOptions,
    timeout: Duration,
) -> Option<Duration> {
    let selector = options.wait_for_selector.as_deref()?;
    let started = Instant::now();

    if let Err(e) = session.wait_for_selector(selector, timeout).await {
        warn!(selector = %selector, error = %e, "Timeout waiting for selector");
    }

    Some(started.elapsed())
}

/// Ask the judge, degrading to the fallback palette on model failure
///
/// Configuration errors (no API key) still abort the strategy.
async fn judge_or_fallback(
    judge: &dyn ColorJudge,
    request: JudgeRequest,
) -> Result<BrandColorSet, ExtractionError> {
    match judge.judge(request).await {
        Ok(colors) => Ok(colors),
        Err(e @ ExtractionError::Config(_)) => Err(e),
        Err(e) => {
            warn!(error = %e, "Color judgement failed, using fallback palette");
            Ok(BrandColorSet::fallback())
        }
    }
}

/// `screenshot_options` metadata entry
fn screenshot_options_json(options: &AnalyzeOptions, full_page: bool) -> Value {
    json!({
        "viewport_width": options.viewport_width,
        "viewport_height": options.viewport_height,
        "full_page": full_page,
        "quality": options.quality,
    })
}
