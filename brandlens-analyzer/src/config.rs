//! Service-level configuration resolution
//!
//! The model API key is resolved with ENV → TOML priority. A missing key is
//! not fatal: the model-backed strategies then fail per request with a
//! configuration error while `dom_statistical` keeps working.

use brandlens_common::config::TomlConfig;
use tracing::{info, warn};

/// Environment variable holding the model API key
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Resolve the model API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = toml_config
        .model
        .api_key
        .as_ref()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Model API key found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Model API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Model API key loaded from TOML config");
        return Some(key.clone());
    }

    warn!(
        "Model API key not configured. Set {} or model.api_key in the config file; \
         model-backed strategies will fail until then",
        API_KEY_ENV_VAR
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
