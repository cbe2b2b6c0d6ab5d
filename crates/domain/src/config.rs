//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_KEYCHAIN_SERVICE, DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEVELOPMENT_BASE_URL, PRODUCTION_BASE_URL,
};
use crate::errors::{KeywayError, Result};

/// Deployment environment with a built-in base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Configuration of the authenticated client.
///
/// Timeouts are stored as whole seconds so the struct reads the same from
/// environment variables, JSON and TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Timeout applied to each transport call unless a request overrides it
    pub request_timeout_secs: u64,
    /// Timeout of the token-refresh call; elapsing it fails the refresh
    pub refresh_timeout_secs: u64,
    /// Path of the token-refresh endpoint
    pub refresh_path: String,
    /// Keychain service under which persisted tokens live
    pub keychain_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::environment(Environment::Development)
    }
}

impl ClientConfig {
    /// Default configuration targeting the given environment.
    pub fn environment(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }

    /// Default configuration with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// Check that the configuration can drive requests.
    ///
    /// # Errors
    /// Returns `KeywayError::Config` if the base URL does not parse as an
    /// absolute URL or either timeout is zero.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url).map_err(|e| {
            KeywayError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        if self.request_timeout_secs == 0 {
            return Err(KeywayError::Config("request timeout must be non-zero".into()));
        }
        if self.refresh_timeout_secs == 0 {
            return Err(KeywayError::Config("refresh timeout must be non-zero".into()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(KeywayError::Config(format!(
                "refresh path must start with '/': {}",
                self.refresh_path
            )));
        }

        Ok(())
    }
}
