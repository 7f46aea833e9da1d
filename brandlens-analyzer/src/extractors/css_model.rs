//! CSS + model strategy
//!
//! Collects stylesheet color rules, inline-colored elements and computed
//! styles of key elements, summarises them in a prompt and lets the color
//! judge decide the roles. Fonts come from the same scan as the DOM strategy.

use super::{judge_or_fallback, open_session, prompts, signals, wait_for_selector};
use crate::fonts;
use crate::services::judge::DEFAULT_TEMPERATURE;
use crate::services::{BrowserLauncher, ColorJudge, JudgeRequest};
use crate::types::{AnalyzeOptions, ExtractionError, ExtractionMethod, ExtractionResult};
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct CssModel {
    launcher: Arc<dyn BrowserLauncher>,
    judge: Arc<dyn ColorJudge>,
    navigation_timeout: Duration,
}

impl CssModel {
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
        match self.run(url, options).await {
            Ok(result) => result,
            Err(e) => {
                error!(url = %url, error = %e, "CSS extraction failed");
                ExtractionResult::failure(ExtractionMethod::CssModel, e, None)
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        options: &AnalyzeOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut session = open_session(self.launcher.as_ref(), options).await?;

        info!(url = %url, "Analyzing CSS/HTML");
        session.navigate(url, self.navigation_timeout).await?;
        wait_for_selector(&mut session, options, self.navigation_timeout).await;

        let raw_fonts = signals::collect_fonts(&mut session).await;
        let css_rules = signals::collect_css_rules(&mut session).await;
        let html_colors = signals::collect_html_colors(&mut session).await;
        let computed_styles = signals::collect_computed_styles(&mut session).await;
        session.release().await;

        let font_selection = fonts::classify_value(&raw_fonts);

        let prompt = prompts::css_prompt(&css_rules, &html_colors, &computed_styles);
        let colors = judge_or_fallback(
            self.judge.as_ref(),
            JudgeRequest::text(prompt, DEFAULT_TEMPERATURE),
        )
        .await?;

        let mut metadata = Map::new();
        metadata.insert("css_rules_count".to_string(), json!(css_rules.len()));
        metadata.insert("html_color_elements_count".to_string(), json!(html_colors.len()));
        metadata.insert("computed_styles_count".to_string(), json!(computed_styles.len()));
        metadata.insert(
            "color_data".to_string(),
            json!({
                "css_rules": css_rules,
                "html_colors": html_colors,
                "computed_styles": computed_styles,
                "url": url,
            }),
        );

        Ok(ExtractionResult::success(
            ExtractionMethod::CssModel,
            colors,
            font_selection,
            Some(metadata),
        ))
    }
}
