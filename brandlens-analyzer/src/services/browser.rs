//! Rendering collaborator seam
//!
//! Strategies talk to a headless browser only through [`BrowserLauncher`] and
//! [`PageSession`]. Production uses the WebDriver adapter; tests plug in
//! in-memory fakes.
//!
//! # Session lifecycle
//! Every strategy run owns one [`BrowserSession`]. The normal path calls
//! [`BrowserSession::release`]; any other exit (early `?` return, panic,
//! task cancellation) drops the guard, which schedules the close on the
//! current tokio runtime.

use crate::types::ExtractionError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Browser viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Screenshot capture options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenshotOptions {
    /// Capture the whole scrollable document instead of the viewport
    pub full_page: bool,
    /// JPEG quality (1-100)
    pub quality: u8,
}

/// One open browser page
#[async_trait]
pub trait PageSession: Send {
    /// Load `url`, returning once the DOM is ready
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ExtractionError>;

    /// Wait until `selector` matches at least one element
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ExtractionError>;

    /// Run a script body in the page and return its JSON result
    async fn evaluate(&mut self, script: &str) -> Result<Value, ExtractionError>;

    /// Capture the page as JPEG bytes
    async fn screenshot(&mut self, options: ScreenshotOptions) -> Result<Vec<u8>, ExtractionError>;

    /// Close the page and its browser
    async fn close(&mut self) -> Result<(), ExtractionError>;
}

/// Opens browser pages
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self, viewport: Viewport) -> Result<Box<dyn PageSession>, ExtractionError>;
}

/// Scoped browser session
///
/// Forwards page operations to the underlying [`PageSession`] and guarantees
/// it is closed exactly once.
pub struct BrowserSession {
    page: Option<Box<dyn PageSession>>,
}

impl BrowserSession {
    /// Open a new page with the given viewport
    pub async fn open(
        launcher: &dyn BrowserLauncher,
        viewport: Viewport,
    ) -> Result<Self, ExtractionError> {
        let page = launcher.open(viewport).await?;
        debug!(width = viewport.width, height = viewport.height, "Browser session opened");
        Ok(Self { page: Some(page) })
    }

    fn page(&mut self) -> Result<&mut Box<dyn PageSession>, ExtractionError> {
        self.page
            .as_mut()
            .ok_or_else(|| ExtractionError::Browser("Browser session already closed".to_string()))
    }

    pub async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ExtractionError> {
        self.page()?.navigate(url, timeout).await
    }

    pub async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ExtractionError> {
        self.page()?.wait_for_selector(selector, timeout).await
    }

    pub async fn evaluate(&mut self, script: &str) -> Result<Value, ExtractionError> {
        self.page()?.evaluate(script).await
    }

    pub async fn screenshot(
        &mut self,
        options: ScreenshotOptions,
    ) -> Result<Vec<u8>, ExtractionError> {
        self.page()?.screenshot(options).await
    }

    /// Close the session on the normal path
    ///
    /// Close failures are logged, never returned: the extraction result is
    /// already decided at this point.
    pub async fn release(mut self) {
        if let Some(mut page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!(error = %e, "Failed to close browser session");
            } else {
                debug!("Browser session closed");
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let Some(mut page) = self.page.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!(error = %e, "Failed to close abandoned browser session");
                    } else {
                        debug!("Abandoned browser session closed");
                    }
                });
            }
            Err(_) => {
                warn!("No tokio runtime available, browser session leaked");
            }
        }
    }
}
