//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment, if one exists
//! 2. Attempts to load from environment variables (`KEYWAY_BASE_URL` set)
//! 3. Otherwise falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//! 6. With no file either, uses the development defaults
//!
//! ## Environment Variables
//! - `KEYWAY_BASE_URL`: Base URL of the API (required for env loading)
//! - `KEYWAY_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `KEYWAY_REFRESH_TIMEOUT_SECS`: Token-refresh timeout in seconds
//! - `KEYWAY_REFRESH_PATH`: Path of the token-refresh endpoint
//! - `KEYWAY_KEYCHAIN_SERVICE`: Keychain service holding persisted tokens
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./keyway.json` or `./keyway.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../keyway.json` or `../keyway.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use keyway_domain::{ClientConfig, KeywayError, Result};

use crate::errors::InfraError;

pub const ENV_BASE_URL: &str = "KEYWAY_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "KEYWAY_REQUEST_TIMEOUT_SECS";
pub const ENV_REFRESH_TIMEOUT_SECS: &str = "KEYWAY_REFRESH_TIMEOUT_SECS";
pub const ENV_REFRESH_PATH: &str = "KEYWAY_REFRESH_PATH";
pub const ENV_KEYCHAIN_SERVICE: &str = "KEYWAY_KEYCHAIN_SERVICE";

const CONFIG_FILE_NAMES: [&str; 4] = ["keyway.json", "keyway.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `KEYWAY_BASE_URL`
/// is missing, falls back to a config file, and finally to
/// [`ClientConfig::default`].
///
/// # Errors
/// Returns `KeywayError::Config` if:
/// - A variable or file is present but invalid
/// - The resulting configuration fails validation
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) if std::env::var(ENV_BASE_URL).is_ok() => return Err(e),
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path))?,
                None => {
                    tracing::info!("No configuration found, using defaults");
                    ClientConfig::default()
                }
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `KEYWAY_BASE_URL` is required; every other variable falls back to the
/// default when unset.
///
/// # Errors
/// Returns `KeywayError::Config` if the base URL is missing or a variable has
/// an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    Ok(ClientConfig {
        base_url: env_var(ENV_BASE_URL)?,
        request_timeout_secs: env_parse(ENV_REQUEST_TIMEOUT_SECS)?
            .unwrap_or(defaults.request_timeout_secs),
        refresh_timeout_secs: env_parse(ENV_REFRESH_TIMEOUT_SECS)?
            .unwrap_or(defaults.refresh_timeout_secs),
        refresh_path: std::env::var(ENV_REFRESH_PATH).unwrap_or(defaults.refresh_path),
        keychain_service: std::env::var(ENV_KEYCHAIN_SERVICE)
            .unwrap_or(defaults.keychain_service),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Fields missing from the file take their default values.
///
/// # Errors
/// Returns `KeywayError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(KeywayError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            KeywayError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents =
        std::fs::read_to_string(&config_path).map_err(|e| KeywayError::from(InfraError::from(e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let parsed: std::result::Result<ClientConfig, InfraError> = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from),
        "json" => serde_json::from_str(contents).map_err(InfraError::from),
        _ => {
            return Err(KeywayError::Config(format!("Unsupported config format: {}", extension)))
        }
    };

    parsed.map_err(KeywayError::from)
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable's
/// directory for `keyway.{json,toml}` and `config.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `KeywayError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        KeywayError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, `None` when unset
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| KeywayError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
