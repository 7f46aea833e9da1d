//! Color judge fakes

use async_trait::async_trait;
use brandlens_analyzer::services::{ColorJudge, JudgeRequest};
use brandlens_analyzer::types::{BrandColorSet, ExtractionError};
use std::sync::{Arc, Mutex};

/// Answers every request with the same colors and keeps the requests
#[derive(Clone)]
pub struct FixedJudge {
    colors: BrandColorSet,
    requests: Arc<Mutex<Vec<JudgeRequest>>>,
}

impl FixedJudge {
    pub fn new(primary: &str, secondary: &str, background: &str, link: &str) -> Self {
        Self {
            colors: BrandColorSet {
                primary_color: primary.to_string(),
                secondary_color: secondary.to_string(),
                background_color: background.to_string(),
                link_color: link.to_string(),
            },
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn colors(&self) -> BrandColorSet {
        self.colors.clone()
    }

    pub fn requests(&self) -> Vec<JudgeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for FixedJudge {
    fn default() -> Self {
        Self::new("#C81E1E", "#112233", "#FFFFFF", "#0066CC")
    }
}

#[async_trait]
impl ColorJudge for FixedJudge {
    async fn judge(&self, request: JudgeRequest) -> Result<BrandColorSet, ExtractionError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.colors.clone())
    }
}

/// Model call that always fails
pub struct FailingJudge;

#[async_trait]
impl ColorJudge for FailingJudge {
    async fn judge(&self, _request: JudgeRequest) -> Result<BrandColorSet, ExtractionError> {
        Err(ExtractionError::Judge("Model returned HTTP 500".to_string()))
    }
}

/// Judge without an API key
pub struct UnconfiguredJudge;

#[async_trait]
impl ColorJudge for UnconfiguredJudge {
    async fn judge(&self, _request: JudgeRequest) -> Result<BrandColorSet, ExtractionError> {
        Err(ExtractionError::Config("No API key configured".to_string()))
    }
}
