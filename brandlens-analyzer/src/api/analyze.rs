//! Brand analysis endpoint
//!
//! POST /analyze runs one extraction strategy against a website and returns
//! its report. A strategy failure is a 400 carrying the strategy's message.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::error;

use crate::types::{AnalyzeOptions, ExtractionMethod, ExtractionResult};
use crate::{ApiError, ApiResult, AppState};

/// Largest accepted viewport edge, in CSS pixels
const MAX_VIEWPORT_EDGE: u32 = 10_000;

/// Largest accepted palette size
const MAX_NUM_COLORS: usize = 64;

/// POST /analyze request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Website to analyze (http or https)
    pub url: String,
    /// Strategy; defaults to `dom_statistical`
    #[serde(default)]
    pub method: Option<ExtractionMethod>,
    /// Rendering options; every field optional
    #[serde(default)]
    pub options: AnalyzeOptions,
}

/// POST /analyze
pub async fn analyze_brand(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<ExtractionResult>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let url = validate_url(&request.url)?;
    validate_options(&request.options)?;

    let result = state
        .analyzer
        .analyze(&url, request.method, &request.options)
        .await;

    if result.success {
        Ok(Json(result))
    } else {
        error!(url = %url, message = %result.message, "Brand analysis failed");
        *state.last_error.write().await = Some(result.message.clone());
        Err(ApiError::ExtractionFailed(result.message))
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| ApiError::BadRequest(format!("Invalid URL '{}': {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::BadRequest(format!(
            "URL scheme must be http or https, got '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::BadRequest(format!("URL has no host: '{}'", trimmed)));
    }

    Ok(trimmed.to_string())
}

/// Reject option values no browser or encoder can honour
pub fn validate_options(options: &AnalyzeOptions) -> ApiResult<()> {
    let edges = [
        ("viewport_width", options.viewport_width),
        ("viewport_height", options.viewport_height),
    ];
    for (name, value) in edges {
        if value == 0 || value > MAX_VIEWPORT_EDGE {
            return Err(ApiError::BadRequest(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_VIEWPORT_EDGE, value
            )));
        }
    }

    if !(1..=100).contains(&options.quality) {
        return Err(ApiError::BadRequest(format!(
            "quality must be between 1 and 100, got {}",
            options.quality
        )));
    }

    if options.num_colors == 0 || options.num_colors > MAX_NUM_COLORS {
        return Err(ApiError::BadRequest(format!(
            "num_colors must be between 1 and {}, got {}",
            MAX_NUM_COLORS, options.num_colors
        )));
    }

    Ok(())
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_brand))
}
