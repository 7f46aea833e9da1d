//! Test Helper Utilities
//!
//! Shared fakes for testing brandlens-analyzer without a browser or model

#![allow(dead_code)]

pub mod fake_browser;
pub mod fake_judge;

// Re-export commonly used items
pub use fake_browser::{banded_screenshot, FakeBrowser, PageScript};
pub use fake_judge::{FailingJudge, FixedJudge, UnconfiguredJudge};
