//! Brand analysis orchestrator
//!
//! Owns the shared collaborators and dispatches each request to the chosen
//! strategy. Every request builds its own strategy and browser session, so
//! concurrent analyses share nothing but the HTTP clients.

use crate::config::resolve_api_key;
use crate::extractors::Extractor;
use crate::services::{BrowserLauncher, ColorJudge, OpenAiJudge, WebDriverLauncher};
use crate::types::{AnalyzeOptions, ExtractionError, ExtractionMethod, ExtractionResult};
use brandlens_common::config::{NavigationTimeouts, TomlConfig};
use std::sync::Arc;
use tracing::info;

pub struct BrandAnalyzer {
    launcher: Arc<dyn BrowserLauncher>,
    judge: Arc<dyn ColorJudge>,
    timeouts: NavigationTimeouts,
}

impl BrandAnalyzer {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        judge: Arc<dyn ColorJudge>,
        timeouts: NavigationTimeouts,
    ) -> Self {
        Self {
            launcher,
            judge,
            timeouts,
        }
    }

    /// Build the production analyzer: WebDriver browser + OpenAI judge
    pub fn from_config(config: &TomlConfig) -> Result<Self, ExtractionError> {
        let launcher = WebDriverLauncher::new(&config.browser)?;
        let judge = OpenAiJudge::new(&config.model, resolve_api_key(config))?;

        info!(
            webdriver_url = %config.browser.webdriver_url,
            model = %judge.model(),
            "Brand analyzer configured"
        );

        Ok(Self::new(
            Arc::new(launcher),
            Arc::new(judge),
            config.browser.navigation,
        ))
    }

    /// Strategy for `method` wired to this analyzer's collaborators
    pub fn extractor(&self, method: ExtractionMethod) -> Extractor {
        Extractor::new(
            method,
            self.launcher.clone(),
            self.judge.clone(),
            &self.timeouts,
        )
    }

    /// Analyze `url` with `method` (default `dom_statistical`)
    ///
    /// Never fails; check `success` on the returned report.
    pub async fn analyze(
        &self,
        url: &str,
        method: Option<ExtractionMethod>,
        options: &AnalyzeOptions,
    ) -> ExtractionResult {
        let method = method.unwrap_or_default();
        info!(url = %url, method = %method, "Analyzing website");

        let result = self.extractor(method).extract(url, options).await;

        info!(
            url = %url,
            method = %method,
            success = result.success,
            "Analysis completed"
        );
        result
    }
}
