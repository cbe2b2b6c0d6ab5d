//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use keyway_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use keyway_infra::config;
use keyway_infra::ApiClient;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_temp_config(
        r#"{
            "base_url": "https://staging.example.com",
            "refresh_timeout_secs": 15,
            "refresh_path": "/auth/refreshToken",
            "keychain_service": "keyway.staging"
        }"#,
        "json",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from JSON file");
    assert_eq!(config.base_url, "https://staging.example.com");
    assert_eq!(config.refresh_timeout_secs, 15);
    assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(config.keychain_service, "keyway.staging");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_temp_config(
        r#"
base_url = "https://toml.example.com"
request_timeout_secs = 20
"#,
        "toml",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from TOML file");
    assert_eq!(config.base_url, "https://toml.example.com");
    assert_eq!(config.request_timeout_secs, 20);
}

#[test]
fn test_loaded_config_drives_a_client() {
    let path = write_temp_config(r#"{ "base_url": "http://127.0.0.1:9" }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let client = ApiClient::new(result.expect("config")).expect("client");
    assert_eq!(client.config().base_url, "http://127.0.0.1:9");
    assert!(!client.is_authenticated());
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let path = write_temp_config("base_url = ", "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(matches!(result, Err(keyway_domain::KeywayError::Config(_))));
}
