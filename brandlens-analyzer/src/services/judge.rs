//! Color-judging model collaborator
//!
//! A [`ColorJudge`] receives a prompt (plus an optional JPEG) and answers with
//! the four brand color roles. The production adapter calls the OpenAI
//! Responses API with a strict JSON schema so the answer always carries the
//! four keys.
//!
//! # API Reference
//! - Endpoint: `POST {api_base}/responses`
//! - Image input: `data:image/jpeg;base64,...` URL in an `input_image` part

use crate::palette::{
    is_hex_color, normalize, DEFAULT_BACKGROUND, DEFAULT_LINK, DEFAULT_PRIMARY, DEFAULT_SECONDARY,
};
use crate::types::{BrandColorSet, ExtractionError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use brandlens_common::config::ModelConfig;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sampling temperature for the CSS and raw screenshot strategies
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for the palette legend strategy
pub const PALETTE_TEMPERATURE: f32 = 0.4;

/// One judging request
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub prompt: String,
    /// JPEG image shown to the model alongside the prompt
    pub image: Option<Vec<u8>>,
    pub temperature: f32,
}

impl JudgeRequest {
    pub fn text(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            temperature,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: Vec<u8>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
            temperature,
        }
    }
}

/// Decides brand colors from a prompt and optional image
///
/// `ExtractionError::Config` means the judge cannot be used at all (for
/// example no API key); strategies fail on it instead of degrading.
#[async_trait]
pub trait ColorJudge: Send + Sync {
    async fn judge(&self, request: JudgeRequest) -> Result<BrandColorSet, ExtractionError>;
}

/// The four color roles as the model wrote them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelColors {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub link_color: String,
}

impl ModelColors {
    /// Normalize each role, replacing anything that is not valid hex with
    /// that role's fallback
    pub fn into_color_set(self) -> BrandColorSet {
        BrandColorSet {
            primary_color: sanitize(&self.primary_color, DEFAULT_PRIMARY),
            secondary_color: sanitize(&self.secondary_color, DEFAULT_SECONDARY),
            background_color: sanitize(&self.background_color, DEFAULT_BACKGROUND),
            link_color: sanitize(&self.link_color, DEFAULT_LINK),
        }
    }
}

fn sanitize(raw: &str, default: &str) -> String {
    match normalize(raw) {
        Some(color) if is_hex_color(&color) => color,
        _ => {
            warn!(value = %raw, fallback = %default, "Model returned an unusable color");
            default.to_string()
        }
    }
}

/// Strict JSON schema for the model answer
fn brand_colors_schema() -> Value {
    let hex = json!({ "type": "string", "description": "Uppercase hex color, e.g. #FF5733" });
    json!({
        "type": "object",
        "properties": {
            "primaryColor": hex,
            "secondaryColor": hex,
            "backgroundColor": hex,
            "linkColor": hex,
        },
        "required": ["primaryColor", "secondaryColor", "backgroundColor", "linkColor"],
        "additionalProperties": false,
    })
}

/// Build the Responses API request body
pub fn build_request_body(model: &str, request: &JudgeRequest) -> Value {
    let mut content = vec![json!({ "type": "input_text", "text": request.prompt })];

    if let Some(image) = &request.image {
        content.push(json!({
            "type": "input_image",
            "image_url": format!("data:image/jpeg;base64,{}", STANDARD.encode(image)),
        }));
    }

    json!({
        "model": model,
        "temperature": request.temperature,
        "input": [{ "role": "user", "content": content }],
        "text": {
            "format": {
                "type": "json_schema",
                "name": "brand_colors",
                "strict": true,
                "schema": brand_colors_schema(),
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Pull the structured answer out of a Responses API reply
pub fn parse_reply(reply: &Value) -> Result<ModelColors, ExtractionError> {
    let reply: ResponsesReply = serde_json::from_value(reply.clone())
        .map_err(|e| ExtractionError::Judge(format!("Unexpected response shape: {}", e)))?;

    if let Some(usage) = &reply.usage {
        info!(usage = %usage, "Model usage");
    }

    for part in reply
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter())
    {
        match part.kind.as_str() {
            "output_text" => {
                let text = part.text.as_deref().unwrap_or_default();
                return serde_json::from_str(text).map_err(|e| {
                    ExtractionError::Judge(format!("Model answer is not valid JSON: {}", e))
                });
            }
            "refusal" => {
                return Err(ExtractionError::Judge(format!(
                    "Model refused: {}",
                    part.refusal.as_deref().unwrap_or("no reason given")
                )));
            }
            _ => continue,
        }
    }

    Err(ExtractionError::Judge("Model reply held no output text".to_string()))
}

/// OpenAI Responses API judge
pub struct OpenAiJudge {
    http_client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiJudge {
    /// Create a judge from model settings
    ///
    /// A missing key is accepted here; every `judge` call then fails with a
    /// configuration error.
    pub fn new(config: &ModelConfig, api_key: Option<String>) -> Result<Self, ExtractionError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ColorJudge for OpenAiJudge {
    async fn judge(&self, request: JudgeRequest) -> Result<BrandColorSet, ExtractionError> {
        let Some(api_key) = &self.api_key else {
            return Err(ExtractionError::Config(
                "OpenAI API key not configured. Set OPENAI_API_KEY or model.api_key in the config file"
                    .to_string(),
            ));
        };

        debug!(
            model = %self.model,
            temperature = request.temperature,
            has_image = request.image.is_some(),
            prompt_chars = request.prompt.len(),
            "Requesting color judgement"
        );

        let url = format!("{}/responses", self.api_base);
        let body = build_request_body(&self.model, &request);

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::Judge(format!("Model API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Judge(format!(
                "Model API returned error {}: {}",
                status, body
            )));
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| ExtractionError::Judge(format!("Failed to parse model response: {}", e)))?;

        let colors = parse_reply(&reply)?.into_color_set();
        debug!(?colors, "Model judgement complete");
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_colors_normalized_per_role() {
        let raw = ModelColors {
            primary_color: "#ff5733".to_string(),
            secondary_color: "rgb(34, 34, 34)".to_string(),
            background_color: "white".to_string(),
            link_color: "#12".to_string(),
        };

        let colors = raw.into_color_set();
        assert_eq!(colors.primary_color, "#FF5733");
        assert_eq!(colors.secondary_color, "#222222");
        assert_eq!(colors.background_color, "#FFFFFF");
        assert_eq!(colors.link_color, "#0066CC");
    }

    #[test]
    fn test_missing_roles_fall_back() {
        let raw: ModelColors = serde_json::from_str(r##"{"primaryColor": "#0A0A0A"}"##).unwrap();
        let colors = raw.into_color_set();

        assert_eq!(colors.primary_color, "#0A0A0A");
        assert_eq!(colors.secondary_color, "#666666");
        assert_eq!(colors.background_color, "#FFFFFF");
    }

    #[test]
    fn test_request_body_with_image() {
        let request = JudgeRequest::with_image("pick colors", vec![0xFF, 0xD8, 0xFF], PALETTE_TEMPERATURE);
        let body = build_request_body("gpt-4.1", &request);

        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["text"]["format"]["type"], "json_schema");
        assert_eq!(body["text"]["format"]["strict"], true);

        let content = body["input"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["text"], "pick colors");
        assert_eq!(content[1]["image_url"], "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_request_body_text_only() {
        let body = build_request_body("gpt-4.1", &JudgeRequest::text("css", DEFAULT_TEMPERATURE));
        assert_eq!(body["input"][0]["content"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_reply_output_text() {
        let reply = json!({
            "output": [
                { "type": "reasoning", "content": [] },
                {
                    "type": "message",
                    "content": [{
                        "type": "output_text",
                        "text": "{\"primaryColor\":\"#E50914\",\"secondaryColor\":\"#221F1F\",\"backgroundColor\":\"#000000\",\"linkColor\":\"#FFFFFF\"}"
                    }]
                }
            ],
            "usage": { "input_tokens": 900, "output_tokens": 40 }
        });

        let colors = parse_reply(&reply).unwrap().into_color_set();
        assert_eq!(colors.primary_color, "#E50914");
        assert_eq!(colors.background_color, "#000000");
    }

    #[test]
    fn test_parse_reply_refusal_and_empty() {
        let refusal = json!({
            "output": [{ "type": "message", "content": [{ "type": "refusal", "refusal": "no" }] }]
        });
        assert!(matches!(parse_reply(&refusal), Err(ExtractionError::Judge(_))));
        assert!(parse_reply(&json!({ "output": [] })).is_err());
        assert!(parse_reply(&json!("nonsense")).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let judge = OpenAiJudge::new(&ModelConfig::default(), None).unwrap();
        let result = judge.judge(JudgeRequest::text("prompt", DEFAULT_TEMPERATURE)).await;

        assert!(matches!(result, Err(ExtractionError::Config(_))));
    }
}
