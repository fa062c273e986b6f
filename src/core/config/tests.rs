use super::data::{Config, CompletionConfig, DEFAULT_MODEL};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.completion.model, DEFAULT_MODEL);
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    assert_eq!(config.set_value("model", "llama-3.3-70b-versatile"), Ok(true));
    assert_eq!(config.set_value("max-tokens", "2048"), Ok(true));
    config.save_to_path(&config_path).expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.completion.model, "llama-3.3-70b-versatile");
    assert_eq!(loaded.completion.max_tokens, 2048);

    assert!(loaded.unset_value("model"));
    loaded.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.completion.model, DEFAULT_MODEL);
    assert_eq!(reloaded.completion.max_tokens, 2048);
}

#[test]
fn partial_files_fill_in_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "data_dir = \"/tmp/ponder-data\"\n\n[completion]\ntemperature = 0.2\n",
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config.completion.temperature, 0.2);
    assert_eq!(config.completion.base_url, CompletionConfig::default().base_url);
    assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/ponder-data")));
    assert_eq!(
        config.resolve_data_dir().unwrap(),
        PathBuf::from("/tmp/ponder-data")
    );
}

#[test]
fn invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[completion\nmodel = ").unwrap();

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn set_value_validates_input() {
    let mut config = Config::default();
    assert_eq!(config.set_value("theme", "dark"), Ok(false));
    assert!(config.set_value("temperature", "3.5").is_err());
    assert!(config.set_value("temperature", "warm").is_err());
    assert!(config.set_value("max-tokens", "0").is_err());
    assert!(config.set_value("model", "  ").is_err());
    assert!(config.set_value("base-url", "not a url").is_err());
    assert_eq!(
        config.set_value("base-url", "http://localhost:8080/v1/"),
        Ok(true)
    );
    assert_eq!(config.completion.base_url, "http://localhost:8080/v1");
    assert_eq!(config, {
        let mut expected = Config::default();
        expected.completion.base_url = "http://localhost:8080/v1".to_string();
        expected
    });
}

#[test]
fn unknown_keys_are_not_unset() {
    let mut config = Config::default();
    assert!(!config.unset_value("font-size"));
    assert!(config.unset_value("timeout"));
}
