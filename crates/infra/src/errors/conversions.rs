//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use keyway_core::TransportError;
use keyway_domain::KeywayError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub KeywayError);

impl From<InfraError> for KeywayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<KeywayError> for InfraError {
    fn from(value: KeywayError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoKeywayError {
    fn into_keyway(self) -> KeywayError;
}

/// Classify a failed round trip for the request pipeline.
pub(crate) trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → KeywayError */
/* -------------------------------------------------------------------------- */

impl IntoKeywayError for KeyringError {
    fn into_keyway(self) -> KeywayError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => KeywayError::Persistence("keychain entry not found".into()),
            BadEncoding(_) => {
                KeywayError::Persistence("token in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => KeywayError::Persistence(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                KeywayError::Persistence(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => KeywayError::Persistence(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                KeywayError::Persistence(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                KeywayError::Persistence(format!("unable to access secure storage: {err}"))
            }
            _ => KeywayError::Persistence(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_keyway())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError / KeywayError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        if self.is_timeout() {
            return TransportError::Timeout;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TransportError::Connect(self.to_string());
        }

        TransportError::Other(self.to_string())
    }
}

impl IntoKeywayError for HttpError {
    fn into_keyway(self) -> KeywayError {
        if self.is_builder() {
            return KeywayError::Config(format!("HTTP client configuration rejected: {self}"));
        }
        KeywayError::Transport(self.into_transport().to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_keyway())
    }
}

/* -------------------------------------------------------------------------- */
/* config file errors → KeywayError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(KeywayError::Config(format!("failed to read config file: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(KeywayError::Config(format!("invalid JSON config: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(KeywayError::Config(format!("invalid TOML config: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
