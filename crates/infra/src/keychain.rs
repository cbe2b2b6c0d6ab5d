//! Token persistence adapters
//!
//! The token store is hydrated from one of these at startup. Entries are kept
//! under a single service name with the keys `accessToken` and
//! `refreshToken`.

use async_trait::async_trait;
use keyring::Entry;
use keyway_core::TokenPersistence;
use keyway_domain::constants::{PERSISTED_ACCESS_TOKEN_KEY, PERSISTED_REFRESH_TOKEN_KEY};
use keyway_domain::{KeywayError, Result, TokenPair};
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::InfraError;

/// Persisted tokens in the platform keychain.
#[derive(Debug, Clone)]
pub struct KeychainTokenPersistence {
    service_name: String,
}

impl KeychainTokenPersistence {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Write both tokens. Called by the login flow, never by the refresh path.
    ///
    /// # Errors
    /// Returns `KeywayError::Persistence` if the keychain rejects the write.
    pub fn store(&self, tokens: &TokenPair) -> Result<()> {
        for (key, value) in [
            (PERSISTED_ACCESS_TOKEN_KEY, tokens.access_token()),
            (PERSISTED_REFRESH_TOKEN_KEY, tokens.refresh_token()),
        ] {
            match value {
                Some(value) => self.entry(key)?.set_password(value).map_err(infra)?,
                None => self.delete(key)?,
            }
        }

        debug!(service = %self.service_name, "Tokens stored in keychain");
        Ok(())
    }

    /// Remove both tokens (idempotent).
    ///
    /// # Errors
    /// Returns `KeywayError::Persistence` if the keychain rejects the delete.
    pub fn clear(&self) -> Result<()> {
        self.delete(PERSISTED_ACCESS_TOKEN_KEY)?;
        self.delete(PERSISTED_REFRESH_TOKEN_KEY)?;
        debug!(service = %self.service_name, "Tokens removed from keychain");
        Ok(())
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(infra)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(infra(err)),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(infra(err)),
        }
    }

    fn load_blocking(&self) -> Result<Option<TokenPair>> {
        debug!(service = %self.service_name, "Reading tokens from keychain");

        let access = self.read(PERSISTED_ACCESS_TOKEN_KEY)?;
        let refresh = self.read(PERSISTED_REFRESH_TOKEN_KEY)?;

        let tokens = TokenPair::from_parts(access, refresh);
        Ok((!tokens.is_empty()).then_some(tokens))
    }
}

fn infra(err: keyring::Error) -> KeywayError {
    InfraError::from(err).into()
}

#[async_trait]
impl TokenPersistence for KeychainTokenPersistence {
    async fn load(&self) -> Result<Option<TokenPair>> {
        let persistence = self.clone();
        tokio::task::spawn_blocking(move || persistence.load_blocking())
            .await
            .map_err(|e| KeywayError::Internal(format!("keychain read task failed: {e}")))?
    }
}

/// Persisted tokens held in memory. For tests and headless use.
#[derive(Debug, Default)]
pub struct InMemoryTokenPersistence {
    tokens: Mutex<Option<TokenPair>>,
}

impl InMemoryTokenPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self { tokens: Mutex::new(Some(tokens)) }
    }

    pub fn store(&self, tokens: TokenPair) {
        *self.tokens.lock() = Some(tokens);
    }

    pub fn clear(&self) {
        *self.tokens.lock() = None;
    }
}

#[async_trait]
impl TokenPersistence for InMemoryTokenPersistence {
    async fn load(&self) -> Result<Option<TokenPair>> {
        Ok(self.tokens.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trip() {
        let persistence = InMemoryTokenPersistence::new();
        assert_eq!(persistence.load().await.unwrap(), None);

        persistence.store(TokenPair::new("T1", "R1"));
        assert_eq!(persistence.load().await.unwrap(), Some(TokenPair::new("T1", "R1")));

        persistence.clear();
        assert_eq!(persistence.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_keychain_entries_load_as_none() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());

        let persistence = KeychainTokenPersistence::new("keyway.tests.empty");
        assert_eq!(persistence.load().await.unwrap(), None);
        assert!(persistence.clear().is_ok());
    }
}
