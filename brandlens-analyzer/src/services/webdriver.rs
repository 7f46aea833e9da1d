//! W3C WebDriver browser adapter
//!
//! Drives a headless Chrome through a WebDriver server (chromedriver,
//! selenium) over plain HTTP. One WebDriver session per [`PageSession`].
//!
//! # API Reference
//! - `POST /session` - new session with `goog:chromeOptions` launch flags
//! - `POST /session/{id}/window/rect` - viewport size
//! - `POST /session/{id}/timeouts` + `POST /session/{id}/url` - navigation
//! - `POST /session/{id}/execute/sync` - script evaluation
//! - `GET /session/{id}/screenshot` - base64 PNG, re-encoded to JPEG here
//! - `DELETE /session/{id}` - close

use super::browser::{BrowserLauncher, PageSession, ScreenshotOptions, Viewport};
use super::palette_image::{decode, encode_jpeg};
use crate::types::ExtractionError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use brandlens_common::config::BrowserConfig;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Tallest window used for full-page captures, in CSS pixels
const MAX_FULL_PAGE_HEIGHT: u32 = 16_384;

/// Interval between selector polls
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Script returning the scrollable document size
const DOCUMENT_SIZE_SCRIPT: &str = r#"
const doc = document.documentElement;
const body = document.body || doc;
return {
    width: Math.max(doc.scrollWidth, body.scrollWidth, doc.clientWidth),
    height: Math.max(doc.scrollHeight, body.scrollHeight, doc.clientHeight)
};
"#;

/// Script testing whether `arguments[0]` matches an element
const SELECTOR_PRESENT_SCRIPT: &str = "return document.querySelector(arguments[0]) !== null;";

/// Error reported by the WebDriver server (or the transport)
#[derive(Debug)]
struct CommandFailure {
    /// WebDriver error code (`timeout`, `javascript error`, ...) or `transport`
    code: String,
    message: String,
}

impl CommandFailure {
    fn transport(message: impl Into<String>) -> Self {
        Self {
            code: "transport".to_string(),
            message: message.into(),
        }
    }

    /// Map to an extraction error, keeping timeouts distinct
    fn into_error(self, wrap: fn(String) -> ExtractionError) -> ExtractionError {
        if self.code == "timeout" || self.code == "script timeout" {
            ExtractionError::Timeout(self.message)
        } else {
            wrap(self.to_string())
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Shared HTTP plumbing for launcher and sessions
#[derive(Clone)]
struct WebDriverClient {
    http_client: Client,
    base_url: String,
}

impl WebDriverClient {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, CommandFailure> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http_client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CommandFailure::transport(format!("WebDriver request failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| {
            CommandFailure::transport(format!("Failed to parse WebDriver response: {}", e))
        })?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if !status.is_success() {
            let code = value["error"].as_str().unwrap_or("unknown error").to_string();
            let message = value["message"]
                .as_str()
                .unwrap_or("no message")
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            return Err(CommandFailure { code, message });
        }

        Ok(value)
    }
}

/// Launches Chrome sessions through a WebDriver server
pub struct WebDriverLauncher {
    client: WebDriverClient,
    launch_args: Vec<String>,
}

impl WebDriverLauncher {
    /// Create a launcher from browser settings
    pub fn new(config: &BrowserConfig) -> Result<Self, ExtractionError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.command_timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: WebDriverClient {
                http_client,
                base_url: config.webdriver_url.trim_end_matches('/').to_string(),
            },
            launch_args: config.launch_args.clone(),
        })
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    // Return from navigation at DOMContentLoaded
                    "pageLoadStrategy": "eager",
                    "goog:chromeOptions": { "args": self.launch_args },
                }
            }
        })
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn open(&self, viewport: Viewport) -> Result<Box<dyn PageSession>, ExtractionError> {
        let value = self
            .client
            .command(Method::POST, "/session", Some(self.capabilities()))
            .await
            .map_err(|e| e.into_error(ExtractionError::Browser))?;

        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| ExtractionError::Browser("WebDriver returned no session id".to_string()))?
            .to_string();

        debug!(session_id = %session_id, "WebDriver session created");

        let mut session = WebDriverSession {
            client: self.client.clone(),
            session_id,
            viewport,
        };

        if let Err(e) = session.set_window_size(viewport.width, viewport.height).await {
            // Session exists server side; do not leak it
            let _ = session.close().await;
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

/// One WebDriver session
pub struct WebDriverSession {
    client: WebDriverClient,
    session_id: String,
    viewport: Viewport,
}

impl WebDriverSession {
    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.session_id, suffix)
    }

    async fn set_window_size(&mut self, width: u32, height: u32) -> Result<(), ExtractionError> {
        self.client
            .command(
                Method::POST,
                &self.path("/window/rect"),
                Some(json!({ "width": width, "height": height })),
            )
            .await
            .map_err(|e| e.into_error(ExtractionError::Browser))?;
        Ok(())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, CommandFailure> {
        self.client
            .command(
                Method::POST,
                &self.path("/execute/sync"),
                Some(json!({ "script": script, "args": args })),
            )
            .await
    }

    async fn capture_png(&self) -> Result<Vec<u8>, ExtractionError> {
        let value = self
            .client
            .command(Method::GET, &self.path("/screenshot"), None)
            .await
            .map_err(|e| e.into_error(ExtractionError::Screenshot))?;

        let encoded = value
            .as_str()
            .ok_or_else(|| ExtractionError::Screenshot("Screenshot payload is not a string".to_string()))?;

        STANDARD
            .decode(encoded)
            .map_err(|e| ExtractionError::Screenshot(format!("Invalid screenshot encoding: {}", e)))
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ExtractionError> {
        self.client
            .command(
                Method::POST,
                &self.path("/timeouts"),
                Some(json!({ "pageLoad": timeout.as_millis() as u64 })),
            )
            .await
            .map_err(|e| e.into_error(ExtractionError::Navigation))?;

        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Navigating");

        self.client
            .command(Method::POST, &self.path("/url"), Some(json!({ "url": url })))
            .await
            .map_err(|e| match e.into_error(ExtractionError::Navigation) {
                ExtractionError::Timeout(msg) => ExtractionError::Timeout(format!(
                    "Navigation to {} exceeded {}ms: {}",
                    url,
                    timeout.as_millis(),
                    msg
                )),
                other => other,
            })?;

        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ExtractionError> {
        let deadline = Instant::now() + timeout;

        loop {
            let present = self
                .execute(SELECTOR_PRESENT_SCRIPT, vec![json!(selector)])
                .await
                .map_err(|e| e.into_error(ExtractionError::Script))?;

            if present.as_bool().unwrap_or(false) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(ExtractionError::Timeout(format!(
                    "Selector '{}' not found within {}ms",
                    selector,
                    timeout.as_millis()
                )));
            }

            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ExtractionError> {
        self.execute(script, Vec::new())
            .await
            .map_err(|e| e.into_error(ExtractionError::Script))
    }

    async fn screenshot(&mut self, options: ScreenshotOptions) -> Result<Vec<u8>, ExtractionError> {
        let png = if options.full_page {
            let size = self
                .execute(DOCUMENT_SIZE_SCRIPT, Vec::new())
                .await
                .map_err(|e| e.into_error(ExtractionError::Script))?;
            let height = size["height"]
                .as_u64()
                .map(|h| h as u32)
                .unwrap_or(self.viewport.height)
                .min(MAX_FULL_PAGE_HEIGHT)
                .max(self.viewport.height);

            debug!(height, "Resizing window for full-page capture");
            self.set_window_size(self.viewport.width, height).await?;
            let captured = self.capture_png().await;
            self.set_window_size(self.viewport.width, self.viewport.height)
                .await?;
            captured?
        } else {
            self.capture_png().await?
        };

        let image = decode(&png)?;
        let jpeg = encode_jpeg(&image, options.quality)?;

        debug!(
            png_bytes = png.len(),
            jpeg_bytes = jpeg.len(),
            quality = options.quality,
            "Screenshot captured"
        );
        Ok(jpeg)
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        self.client
            .command(Method::DELETE, &self.path(""), None)
            .await
            .map_err(|e| e.into_error(ExtractionError::Browser))?;
        debug!(session_id = %self.session_id, "WebDriver session deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_carry_launch_args() {
        let launcher = WebDriverLauncher::new(&BrowserConfig::default()).unwrap();
        let caps = launcher.capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always["browserName"], "chrome");
        assert_eq!(always["pageLoadStrategy"], "eager");
        let args = always["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--no-sandbox"));
    }

    #[test]
    fn test_timeout_codes_map_to_timeout() {
        let failure = CommandFailure {
            code: "timeout".to_string(),
            message: "page load".to_string(),
        };
        assert!(matches!(
            failure.into_error(ExtractionError::Navigation),
            ExtractionError::Timeout(_)
        ));

        let failure = CommandFailure {
            code: "javascript error".to_string(),
            message: "x is not defined".to_string(),
        };
        match failure.into_error(ExtractionError::Script) {
            ExtractionError::Script(msg) => assert_eq!(msg, "javascript error: x is not defined"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = BrowserConfig {
            webdriver_url: "http://localhost:4444/".to_string(),
            ..Default::default()
        };
        let launcher = WebDriverLauncher::new(&config).unwrap();
        assert_eq!(launcher.client.base_url, "http://localhost:4444");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_browser_error() {
        let config = BrowserConfig {
            // Reserved port, nothing listens there
            webdriver_url: "http://127.0.0.1:9".to_string(),
            command_timeout_secs: 2,
            ..Default::default()
        };
        let launcher = WebDriverLauncher::new(&config).unwrap();

        let result = launcher.open(Viewport::default()).await;
        assert!(matches!(result, Err(ExtractionError::Browser(_))));
    }
}
