//! Configuration loading and config file resolution
//!
//! Config file path resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `BRANDLENS_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/brandlens/config.toml` on Linux)
//! 4. Compiled defaults (no file at all)
//!
//! A missing or malformed config file never terminates startup: a warning is
//! logged and the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BRANDLENS_CONFIG";

/// Default WebDriver endpoint (chromedriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Default model API base URL
pub const DEFAULT_MODEL_API_BASE: &str = "https://api.openai.com/v1";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Chrome flags used for every headless session
const DEFAULT_LAUNCH_ARGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
];

/// Complete brandlens configuration file
///
/// Every section is optional in the file; absent keys take compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
        }
    }
}

/// Headless browser (WebDriver) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver server URL (chromedriver, selenium, ...)
    pub webdriver_url: String,
    /// Command-line flags passed to the browser
    pub launch_args: Vec<String>,
    /// Timeout for individual WebDriver commands, in seconds
    pub command_timeout_secs: u64,
    /// Per-strategy navigation timeouts
    pub navigation: NavigationTimeouts,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            launch_args: DEFAULT_LAUNCH_ARGS.iter().map(|s| s.to_string()).collect(),
            command_timeout_secs: 60,
            navigation: NavigationTimeouts::default(),
        }
    }
}

/// Navigation timeouts per extraction strategy, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationTimeouts {
    pub dom_statistical_ms: u64,
    pub css_model_ms: u64,
    pub screenshot_model_ms: u64,
    pub screenshot_palette_ms: u64,
}

impl Default for NavigationTimeouts {
    fn default() -> Self {
        Self {
            dom_statistical_ms: 10_000,
            css_model_ms: 7_000,
            screenshot_model_ms: 7_000,
            screenshot_palette_ms: 15_000,
        }
    }
}

/// Color-judging model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_base: String,
    /// API key; `OPENAI_API_KEY` takes precedence when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_MODEL_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Apply `BRANDLENS_*` environment variable overrides
    ///
    /// Invalid values (e.g. a non-numeric port) are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BRANDLENS_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("BRANDLENS_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Ignoring BRANDLENS_PORT={}: {}", port, e),
            }
        }

        if let Ok(url) = std::env::var("BRANDLENS_WEBDRIVER_URL") {
            self.browser.webdriver_url = url;
        }

        if let Ok(model) = std::env::var("BRANDLENS_MODEL") {
            self.model.model = model;
        }

        if let Ok(level) = std::env::var("BRANDLENS_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// Resolves which config file to load, then loads it with graceful degradation
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver; `cli_path` is the `--config` argument if given
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve the config file path
    ///
    /// Returns `None` when no explicit path is given and the platform config
    /// file does not exist.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|path| path.exists())
    }

    /// Load the resolved configuration
    ///
    /// Never fails: missing or invalid files fall back to compiled defaults.
    /// Environment overrides are applied last.
    pub fn load(&self) -> TomlConfig {
        let mut config = match self.resolve_path() {
            Some(path) => match load_toml_config(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{} - using compiled defaults", e);
                    TomlConfig::default()
                }
            },
            None => {
                info!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        config.apply_env_overrides();
        config
    }
}

/// Platform config file location (`<config dir>/brandlens/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("brandlens").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read config {} failed: {}", path.display(), e))
    })?;

    let config: TomlConfig = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse config {} failed: {}", path.display(), e))
    })?;

    #[cfg(unix)]
    {
        if config.model.api_key.is_some() && check_toml_permissions_loose(path)? {
            warn!(
                "Config file {} contains an API key but is readable by other users (expected mode 0600)",
                path.display()
            );
        }
    }

    Ok(config)
}

/// Whether a config file is readable or writable by group/other
#[cfg(unix)]
pub fn check_toml_permissions_loose(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(mode & 0o077 != 0)
}
