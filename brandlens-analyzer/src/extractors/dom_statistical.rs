//! DOM statistical strategy
//!
//! Reads computed styles of every element and decides colors and fonts with
//! the deterministic palette core. No model involved.

use super::{open_session, signals, wait_for_selector};
use crate::fonts;
use crate::palette::{rank, select_roles};
use crate::services::BrowserLauncher;
use crate::types::{AnalyzeOptions, ExtractionError, ExtractionMethod, ExtractionResult};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub struct DomStatistical {
    launcher: Arc<dyn BrowserLauncher>,
    navigation_timeout: Duration,
}

impl DomStatistical {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, navigation_timeout: Duration) -> Self {
        Self {
            launcher,
            navigation_timeout,
        }
    }

    pub async fn extract(&self, url: &str, options: &AnalyzeOptions) -> ExtractionResult {
        match self.run(url, options).await {
            Ok(result) => result,
            Err(e) => {
                error!(url = %url, error = %e, "DOM extraction failed");
                ExtractionResult::failure(ExtractionMethod::DomStatistical, e, None)
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        options: &AnalyzeOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut session = open_session(self.launcher.as_ref(), options).await?;

        info!(url = %url, "Navigating");
        session.navigate(url, self.navigation_timeout).await?;
        wait_for_selector(&mut session, options, self.navigation_timeout).await;

        let raw_fonts = signals::collect_fonts(&mut session).await;
        let raw_colors = signals::collect_colors(&mut session).await;
        session.release().await;

        let font_selection = fonts::classify_value(&raw_fonts);
        let ranked = rank(&raw_colors.observations());
        let colors = select_roles(&ranked);

        debug!(
            candidates = ranked.most_common.len(),
            distinct = ranked.frequencies.len(),
            primary = %colors.primary_color,
            secondary = %colors.secondary_color,
            "Colors decided"
        );

        let total_fonts_found = raw_fonts.as_array().map_or(0, Vec::len);
        let mut metadata = Map::new();
        metadata.insert(
            "processing_stats".to_string(),
            json!({
                "total_fonts_found": total_fonts_found,
                "total_colors_found": raw_colors.total(),
            }),
        );
        metadata.insert("most_common_colors".to_string(), json!(ranked.most_common));
        metadata.insert("raw_colors".to_string(), json!(raw_colors));
        metadata.insert("raw_fonts".to_string(), raw_fonts);

        Ok(ExtractionResult::success(
            ExtractionMethod::DomStatistical,
            colors,
            font_selection,
            Some(metadata),
        ))
    }
}
