//! In-memory browser fake
//!
//! Answers each page script with a canned JSON value and records what the
//! strategy asked for.

use async_trait::async_trait;
use brandlens_analyzer::extractors::signals;
use brandlens_analyzer::services::palette_image;
use brandlens_analyzer::services::{BrowserLauncher, PageSession, ScreenshotOptions, Viewport};
use brandlens_analyzer::types::ExtractionError;
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned page behaviour
#[derive(Debug, Clone)]
pub struct PageScript {
    pub fonts: Value,
    pub colors: Value,
    pub css_rules: Value,
    pub html_colors: Value,
    pub computed_styles: Value,
    /// Bytes returned by every screenshot; `None` makes capture fail
    pub screenshot: Option<Vec<u8>>,
    /// Navigation fails with a timeout carrying this message
    pub navigation_timeout: Option<String>,
    /// `wait_for_selector` never finds its element
    pub selector_missing: bool,
}

impl Default for PageScript {
    fn default() -> Self {
        Self {
            fonts: json!(["Inter", "Helvetica", "sans-serif"]),
            colors: json!({
                "textColors": ["rgb(17, 34, 51)", "rgb(17, 34, 51)", "rgb(200, 30, 30)"],
                "backgroundColors": ["rgb(255, 255, 255)"],
                "borderColors": [],
                "linkColors": ["rgb(0, 102, 204)"]
            }),
            css_rules: json!([
                {
                    "selector": ".btn-primary",
                    "cssText": ".btn-primary { background-color: #C81E1E; }",
                    "color": "",
                    "backgroundColor": "#C81E1E",
                    "borderColor": ""
                }
            ]),
            html_colors: json!([
                {
                    "tagName": "div",
                    "className": "hero",
                    "id": "",
                    "style": "color: #112233",
                    "color": "",
                    "bgcolor": "",
                    "text": "Welcome"
                }
            ]),
            computed_styles: json!([
                {
                    "selector": "a",
                    "tagName": "a",
                    "className": "",
                    "id": "",
                    "color": "rgb(0, 102, 204)",
                    "backgroundColor": "rgba(0, 0, 0, 0)",
                    "borderColor": "rgb(0, 102, 204)",
                    "fontFamily": "Inter, sans-serif",
                    "text": "Pricing"
                }
            ]),
            screenshot: Some(banded_screenshot()),
            navigation_timeout: None,
            selector_missing: false,
        }
    }
}

/// Launcher handing out [`PageScript`] pages
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pub script: PageScript,
    /// Opening a session fails with this browser error
    pub open_error: Option<String>,
    opened: Arc<Mutex<Vec<Viewport>>>,
    closes: Arc<AtomicUsize>,
    screenshots: Arc<Mutex<Vec<ScreenshotOptions>>>,
}

impl FakeBrowser {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    pub fn failing_to_open(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Viewports of every opened session
    pub fn opened(&self) -> Vec<Viewport> {
        self.opened.lock().unwrap().clone()
    }

    /// Number of closed sessions
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Options of every screenshot taken
    pub fn screenshots(&self) -> Vec<ScreenshotOptions> {
        self.screenshots.lock().unwrap().clone()
    }

    /// Wait for sessions abandoned on error paths to be closed in the background
    pub async fn settle(&self) {
        for _ in 0..20 {
            if self.closes() >= self.opened().len() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn open(&self, viewport: Viewport) -> Result<Box<dyn PageSession>, ExtractionError> {
        if let Some(message) = &self.open_error {
            return Err(ExtractionError::Browser(message.clone()));
        }

        self.opened.lock().unwrap().push(viewport);
        Ok(Box::new(FakePage {
            script: self.script.clone(),
            closes: self.closes.clone(),
            screenshots: self.screenshots.clone(),
        }))
    }
}

struct FakePage {
    script: PageScript,
    closes: Arc<AtomicUsize>,
    screenshots: Arc<Mutex<Vec<ScreenshotOptions>>>,
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ExtractionError> {
        match &self.script.navigation_timeout {
            Some(message) => Err(ExtractionError::Timeout(format!(
                "{} after {:?} loading {}",
                message, timeout, url
            ))),
            None => Ok(()),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), ExtractionError> {
        if self.script.selector_missing {
            Err(ExtractionError::Timeout(format!("No element matches {}", selector)))
        } else {
            Ok(())
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ExtractionError> {
        let value = if script == signals::FONT_SCRIPT {
            &self.script.fonts
        } else if script == signals::COLOR_SCRIPT {
            &self.script.colors
        } else if script == signals::CSS_RULES_SCRIPT {
            &self.script.css_rules
        } else if script == signals::HTML_COLORS_SCRIPT {
            &self.script.html_colors
        } else if script == signals::COMPUTED_STYLES_SCRIPT {
            &self.script.computed_styles
        } else {
            return Err(ExtractionError::Script("Unknown script".to_string()));
        };
        Ok(value.clone())
    }

    async fn screenshot(&mut self, options: ScreenshotOptions) -> Result<Vec<u8>, ExtractionError> {
        self.screenshots.lock().unwrap().push(options);
        self.script
            .screenshot
            .clone()
            .ok_or_else(|| ExtractionError::Screenshot("Capture failed".to_string()))
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 160x120 JPEG of three flat bands: dark blue, red, light grey
pub fn banded_screenshot() -> Vec<u8> {
    let bands = [[20, 40, 120], [200, 30, 30], [230, 230, 230]];
    let image = RgbImage::from_fn(160, 120, |_, y| {
        let band = (y / 48).min(2) as usize;
        Rgb(bands[band])
    });
    palette_image::encode_jpeg(&DynamicImage::ImageRgb8(image), 95).unwrap()
}
