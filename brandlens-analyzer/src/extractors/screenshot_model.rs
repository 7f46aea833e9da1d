//! Screenshot + model strategy
//!
//! Captures a JPEG screenshot (full page by default) and lets the vision judge
//! read the brand roles straight from it.

use super::{
    judge_or_fallback, open_session, prompts, screenshot_options_json, signals, wait_for_selector,
};
use crate::fonts;
use crate::services::judge::DEFAULT_TEMPERATURE;
use crate::services::{BrowserLauncher, ColorJudge, JudgeRequest, ScreenshotOptions};
use crate::timing::{self, StepTimings};
use crate::types::{AnalyzeOptions, ExtractionError, ExtractionMethod, ExtractionResult};
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

pub struct ScreenshotModel {
    launcher: Arc<dyn BrowserLauncher>,
    judge: Arc<dyn ColorJudge>,
    navigation_timeout: Duration,
}

impl ScreenshotModel {
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
                error!(url = %url, error = %e, "Screenshot extraction failed");

                let mut metadata = Map::new();
                metadata.insert("timing".to_string(), timings.to_json());
                ExtractionResult::failure(ExtractionMethod::ScreenshotModel, e, Some(metadata))
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
        info!(url = %url, "Taking screenshot for direct analysis");
        session.navigate(url, self.navigation_timeout).await?;
        timings.record(timing::PAGE_NAVIGATION, step);

        if let Some(waited) = wait_for_selector(&mut session, options, self.navigation_timeout).await {
            timings.record_duration(timing::SELECTOR_WAIT, waited);
        }

        let step = Instant::now();
        let screenshot = session
            .screenshot(ScreenshotOptions {
                full_page: options.full_page,
                quality: options.quality,
            })
            .await?;
        timings.record(timing::SCREENSHOT_CAPTURE, step);

        let raw_fonts = signals::collect_fonts(&mut session).await;
        session.release().await;
        let font_selection = fonts::classify_value(&raw_fonts);

        let screenshot_size = screenshot.len();
        let step = Instant::now();
        let colors = judge_or_fallback(
            self.judge.as_ref(),
            JudgeRequest::with_image(prompts::screenshot_prompt(), screenshot, DEFAULT_TEMPERATURE),
        )
        .await?;
        timings.record(timing::LLM_ANALYSIS, step);
        timings.finish();

        let mut metadata = Map::new();
        metadata.insert("screenshot_size_bytes".to_string(), json!(screenshot_size));
        metadata.insert("timing".to_string(), timings.to_json());
        metadata.insert(
            "screenshot_options".to_string(),
            screenshot_options_json(options, options.full_page),
        );

        Ok(ExtractionResult::success(
            ExtractionMethod::ScreenshotModel,
            colors,
            font_selection,
            Some(metadata),
        ))
    }
}
