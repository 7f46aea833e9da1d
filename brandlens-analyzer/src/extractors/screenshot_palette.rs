//! Screenshot + palette legend strategy
//!
//! Captures a viewport screenshot, quantizes its dominant colors, appends a
//! legend strip of those colors and asks the vision judge to pick every role
//! from the legend.
//!
//! Unlike the other strategies a navigation error is not fatal here: slow
//! pages usually have rendered enough to screenshot when the timeout fires.

use super::{
    judge_or_fallback, open_session, prompts, screenshot_options_json, signals, wait_for_selector,
};
use crate::fonts;
use crate::services::judge::PALETTE_TEMPERATURE;
use crate::services::palette_image::{self, FALLBACK_PALETTE};
use crate::services::{BrowserLauncher, ColorJudge, JudgeRequest, ScreenshotOptions};
use crate::timing::{self, StepTimings};
use crate::types::{AnalyzeOptions, ExtractionError, ExtractionMethod, ExtractionResult};
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub struct ScreenshotPalette {
    launcher: Arc<dyn BrowserLauncher>,
    judge: Arc<dyn ColorJudge>,
    navigation_timeout: Duration,
}

impl ScreenshotPalette {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        judge: Arc<dyn ColorJudge>,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            judge,
            navigation_timeout,
        }
    }

    pub async fn extract(&self, url: &str, options: &AnalyzeOptions) -> ExtractionResult {
        let mut timings = StepTimings::start();

        match self.run(url, options, &mut timings).await {
            Ok(result) => result,
            Err(e) => {
                timings.finish();
                error!(url = %url, error = %e, "Screenshot palette extraction failed");

                let mut metadata = Map::new();
                metadata.insert("timing".to_string(), timings.to_json());
                ExtractionResult::failure(ExtractionMethod::ScreenshotPalette, e, Some(metadata))
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        options: &AnalyzeOptions,
        timings: &mut StepTimings,
    ) -> Result<ExtractionResult, ExtractionError> {
        let step = Instant::now();
        let mut session = open_session(self.launcher.as_ref(), options).await?;
        timings.record(timing::BROWSER_SETUP, step);

        let step = Instant::now();
        info!(url = %url, "Taking screenshot with palette");
        if let Err(e) = session.navigate(url, self.navigation_timeout).await {
            warn!(url = %url, error = %e, "Navigation did not complete, capturing anyway");
        }
        timings.record(timing::PAGE_NAVIGATION, step);

        if let Some(waited) = wait_for_selector(&mut session, options, self.navigation_timeout).await {
            timings.record_duration(timing::SELECTOR_WAIT, waited);
        }

        let step = Instant::now();
        let screenshot = session
            .screenshot(ScreenshotOptions {
                full_page: false,
                quality: options.quality,
            })
            .await?;
        timings.record(timing::SCREENSHOT_CAPTURE, step);

        let raw_fonts = signals::collect_fonts(&mut session).await;
        session.release().await;
        let font_selection = fonts::classify_value(&raw_fonts);

        let step = Instant::now();
        let extracted_colors = extract_palette(&screenshot, options.num_colors).await;
        timings.record(timing::COLOR_EXTRACTION, step);

        let step = Instant::now();
        let combined = compose(&screenshot, &extracted_colors).await;
        timings.record(timing::PALETTE_CREATION, step);

        let combined_size = combined.len();
        let step = Instant::now();
        let colors = judge_or_fallback(
            self.judge.as_ref(),
            JudgeRequest::with_image(
                prompts::palette_prompt(&extracted_colors),
                combined,
                PALETTE_TEMPERATURE,
            ),
        )
        .await?;
        timings.record(timing::LLM_ANALYSIS, step);
        timings.finish();

        let mut metadata = Map::new();
        metadata.insert("extracted_colors".to_string(), json!(extracted_colors));
        metadata.insert("combined_image_size_bytes".to_string(), json!(combined_size));
        metadata.insert(
            "original_screenshot_size_bytes".to_string(),
            json!(screenshot.len()),
        );
        metadata.insert("timing".to_string(), timings.to_json());
        metadata.insert("num_colors".to_string(), json!(options.num_colors));
        metadata.insert(
            "screenshot_options".to_string(),
            screenshot_options_json(options, false),
        );

        Ok(ExtractionResult::success(
            ExtractionMethod::ScreenshotPalette,
            colors,
            font_selection,
            Some(metadata),
        ))
    }
}

/// Dominant screenshot colors, or the fixed fallback palette
async fn extract_palette(screenshot: &[u8], num_colors: usize) -> Vec<String> {
    let bytes = screenshot.to_vec();
    let result = tokio::task::spawn_blocking(move || palette_image::dominant_colors(&bytes, num_colors))
        .await
        .map_err(|e| ExtractionError::Image(format!("Quantization task failed: {}", e)))
        .and_then(|result| result);

    match result {
        Ok(colors) => {
            info!(count = colors.len(), colors = ?colors, "Extracted screenshot palette");
            colors
        }
        Err(e) => {
            warn!(error = %e, "Palette extraction failed, using fallback palette");
            FALLBACK_PALETTE.iter().map(|c| c.to_string()).collect()
        }
    }
}

/// Screenshot with legend strip, or the plain screenshot
async fn compose(screenshot: &[u8], colors: &[String]) -> Vec<u8> {
    let bytes = screenshot.to_vec();
    let colors = colors.to_vec();
    let result = tokio::task::spawn_blocking(move || palette_image::compose_legend(&bytes, &colors))
        .await
        .map_err(|e| ExtractionError::Image(format!("Legend task failed: {}", e)))
        .and_then(|result| result);

    match result {
        Ok(combined) => {
            info!(size_bytes = combined.len(), "Created combined image with palette");
            combined
        }
        Err(e) => {
            warn!(error = %e, "Legend composition failed, sending plain screenshot");
            screenshot.to_vec()
        }
    }
}
