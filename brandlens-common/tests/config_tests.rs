//! Configuration resolution and graceful degradation tests
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that touch BRANDLENS_* variables are marked #[serial].

use brandlens_common::config::{load_toml_config, ConfigResolver, TomlConfig, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var("BRANDLENS_HOST");
    env::remove_var("BRANDLENS_PORT");
    env::remove_var("BRANDLENS_WEBDRIVER_URL");
    env::remove_var("BRANDLENS_MODEL");
    env::remove_var("BRANDLENS_LOG_LEVEL");
}

#[test]
#[serial]
fn test_cli_path_has_highest_priority() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/from-cli.toml")));
    assert_eq!(resolver.resolve_path(), Some(PathBuf::from("/tmp/from-cli.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.resolve_path(), Some(PathBuf::from("/tmp/from-env.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = ConfigResolver::new(Some(missing)).load();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_falls_back_to_defaults() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(load_toml_config(&path).is_err());

    let config = ConfigResolver::new(Some(path)).load();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_env_overrides_applied_after_file() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        port = 9000

        [model]
        model = "from-file"
        "#,
    )
    .unwrap();

    env::set_var("BRANDLENS_PORT", "9555");
    env::set_var("BRANDLENS_WEBDRIVER_URL", "http://chromedriver:4444");

    let config = ConfigResolver::new(Some(path)).load();
    assert_eq!(config.server.port, 9555);
    assert_eq!(config.browser.webdriver_url, "http://chromedriver:4444");
    assert_eq!(config.model.model, "from-file");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_port_override_is_ignored() {
    clear_env();
    env::set_var("BRANDLENS_PORT", "not-a-port");

    let mut config = TomlConfig::default();
    config.apply_env_overrides();
    assert_eq!(config.server.port, 8000);

    clear_env();
}

#[cfg(unix)]
#[test]
fn test_check_permissions_detects_loose() {
    use brandlens_common::config::check_toml_permissions_loose;
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nport = 8000\n").unwrap();

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert!(check_toml_permissions_loose(&path).unwrap());

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
    assert!(!check_toml_permissions_loose(&path).unwrap());
}

#[cfg(unix)]
#[test]
fn test_loose_config_with_api_key_still_loads() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[model]\napi_key = \"sk-test\"\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    // Loose permissions only warn
    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
}
