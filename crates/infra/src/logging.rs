//! Tracing subscriber setup
//!
//! Filtering follows `RUST_LOG` (default `info`). Set `KEYWAY_LOG_FORMAT=json`
//! for one JSON object per event.

use keyway_domain::{KeywayError, Result};
use tracing_subscriber::EnvFilter;

pub const ENV_LOG_FORMAT: &str = "KEYWAY_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Format selected by `KEYWAY_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_LOG_FORMAT).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `KeywayError::Internal` if a global subscriber is already set.
pub fn init() -> Result<()> {
    init_with(LogFormat::from_env())
}

/// Install the global subscriber with an explicit format.
///
/// # Errors
/// Returns `KeywayError::Internal` if a global subscriber is already set.
pub fn init_with(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init(),
    };

    installed.map_err(|e| KeywayError::Internal(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_format_is_opt_in() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Compact);
        assert_eq!(LogFormat::parse(None), LogFormat::Compact);
    }

    #[test]
    fn second_init_is_an_error() {
        let _ = init_with(LogFormat::Compact);
        assert!(matches!(init_with(LogFormat::Compact), Err(KeywayError::Internal(_))));
    }
}
