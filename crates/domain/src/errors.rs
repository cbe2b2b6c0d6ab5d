//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::TRANSPORT_FAILURE_CODE;

/// Outcome of a single logical API call that did not succeed.
///
/// The application only ever sees one of these per call. `AuthExpired` is an
/// internal signal: the executor resolves it into a retried call or
/// [`ApiError::RefreshFailed`] before returning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad URL: {0}")]
    BadUrl(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Server error ({code}): {message}")]
    ServerError { code: u16, message: String },

    #[error("No network connectivity")]
    NoConnectivity,

    #[error("Access token expired (status {code})")]
    AuthExpired { code: u16 },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

impl ApiError {
    /// Server error for a failure that never produced an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::ServerError { code: TRANSPORT_FAILURE_CODE, message: message.into() }
    }

    /// Status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { code, .. } | Self::AuthExpired { code } => Some(*code),
            _ => None,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::BadUrl(_) => "bad_url",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::ServerError { .. } => "server",
            Self::NoConnectivity => "no_connectivity",
            Self::AuthExpired { .. } => "auth_expired",
            Self::RefreshFailed(_) => "refresh_failed",
        }
    }
}

/// Why one refresh cycle failed.
///
/// Cloneable because a single outcome is handed to every waiter of the cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh endpoint returned status {0}")]
    Status(u16),

    #[error("refresh response malformed: {0}")]
    MalformedResponse(String),

    #[error("refresh request timed out")]
    Timeout,
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        Self::RefreshFailed(err.to_string())
    }
}

/// Errors outside the request pipeline (configuration, persisted tokens).
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum KeywayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for non-request operations
pub type Result<T> = std::result::Result<T, KeywayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_use_code_zero() {
        let err = ApiError::transport("connection reset");
        assert_eq!(err.status_code(), Some(0));
        assert_eq!(err.category(), "server");
    }

    #[test]
    fn refresh_error_becomes_refresh_failed() {
        let err: ApiError = RefreshError::Status(401).into();
        assert!(matches!(err, ApiError::RefreshFailed(ref msg) if msg.contains("401")));
        assert_eq!(err.category(), "refresh_failed");
    }

    #[test]
    fn keyway_error_serializes_tagged() {
        let json = serde_json::to_value(KeywayError::Config("missing".into())).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing");
    }
}
