//! Process-wide holder of the current token pair
//!
//! One instance is created per client and shared (`Arc`) between the
//! executor and the refresh coordinator. Reads may run concurrently with each
//! other; a write takes the lock exclusively, so a reader always sees either
//! the old pair or the new pair, never a mix.

use keyway_domain::{Result, TokenPair};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::ports::TokenPersistence;

/// Shared holder of the access/refresh token pair.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: RwLock<TokenPair>,
}

impl TokenStore {
    /// Empty store (logged out).
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self { tokens: RwLock::new(tokens) }
    }

    /// Consistent copy of the current pair.
    pub fn snapshot(&self) -> TokenPair {
        self.tokens.read().clone()
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token().map(str::to_owned)
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh_token().map(str::to_owned)
    }

    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.read().access_token().is_some()
    }

    /// Load the persisted pair, if any, into the store.
    ///
    /// Returns `true` when tokens were found. A missing entry is not an error.
    ///
    /// # Errors
    /// Propagates failures of the persistence backend.
    pub async fn hydrate(&self, persistence: &dyn TokenPersistence) -> Result<bool> {
        match persistence.load().await? {
            Some(tokens) if !tokens.is_empty() => {
                *self.tokens.write() = tokens;
                info!("Token store hydrated from persisted state");
                Ok(true)
            }
            _ => {
                debug!("No persisted tokens found");
                Ok(false)
            }
        }
    }

    /// Install the pair obtained by an explicit login flow.
    pub fn login(&self, tokens: TokenPair) {
        *self.tokens.write() = tokens;
        info!("Tokens installed by login");
    }

    /// Forget both tokens (logout).
    pub fn clear(&self) {
        *self.tokens.write() = TokenPair::empty();
        info!("Tokens cleared");
    }

    /// Atomically swap in a refreshed pair. Only the refresh coordinator
    /// writes through here.
    pub(crate) fn replace(&self, tokens: TokenPair) {
        *self.tokens.write() = tokens;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use keyway_domain::KeywayError;

    use super::*;

    struct FixedPersistence(Option<TokenPair>);

    #[async_trait]
    impl TokenPersistence for FixedPersistence {
        async fn load(&self) -> Result<Option<TokenPair>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPersistence;

    #[async_trait]
    impl TokenPersistence for BrokenPersistence {
        async fn load(&self) -> Result<Option<TokenPair>> {
            Err(KeywayError::Persistence("keychain locked".into()))
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = TokenStore::new();
        assert!(store.snapshot().is_empty());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn replace_swaps_both_tokens() {
        let store = TokenStore::with_tokens(TokenPair::new("T1", "R1"));
        store.replace(TokenPair::new("T2", "R2"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.access_token(), Some("T2"));
        assert_eq!(snapshot.refresh_token(), Some("R2"));
    }

    #[test]
    fn login_and_clear() {
        let store = TokenStore::new();
        store.login(TokenPair::new("T1", "R1"));
        assert_eq!(store.access_token().as_deref(), Some("T1"));

        store.clear();
        assert_eq!(store.refresh_token(), None);
    }

    #[tokio::test]
    async fn hydrate_loads_persisted_pair() {
        let store = TokenStore::new();
        let loaded = store
            .hydrate(&FixedPersistence(Some(TokenPair::new("T1", "R1"))))
            .await
            .unwrap();

        assert!(loaded);
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn hydrate_without_persisted_pair_keeps_store_empty() {
        let store = TokenStore::new();
        assert!(!store.hydrate(&FixedPersistence(None)).await.unwrap());
        assert!(!store.hydrate(&FixedPersistence(Some(TokenPair::empty()))).await.unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn hydrate_propagates_backend_errors() {
        let store = TokenStore::new();
        let result = store.hydrate(&BrokenPersistence).await;
        assert!(matches!(result, Err(KeywayError::Persistence(_))));
    }
}
