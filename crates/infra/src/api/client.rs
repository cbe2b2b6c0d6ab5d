//! API client facade
//!
//! Every call goes through the [`RequestExecutor`], so it inherits the
//! connectivity check, the single retry after a shared token refresh, and
//! the error taxonomy of [`ApiError`].

use std::sync::Arc;

use keyway_core::{
    ConnectivityGate, RefreshCoordinator, RequestExecutor, TokenPersistence, TokenStore,
    Transport, TransportResponse,
};
use keyway_domain::{ApiError, ClientConfig, KeywayError, RequestDescriptor, TokenPair};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, instrument};

use crate::connectivity::AlwaysReachable;
use crate::http::HttpTransport;
use crate::keychain::KeychainTokenPersistence;

/// Authenticated API client
pub struct ApiClient {
    config: ClientConfig,
    store: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
    executor: RequestExecutor,
    keychain: KeychainTokenPersistence,
}

impl ApiClient {
    /// Create a client with the default transport, gate and an empty store
    ///
    /// # Errors
    ///
    /// Returns `KeywayError::Config` if the configuration is invalid
    pub fn new(config: ClientConfig) -> Result<Self, KeywayError> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Keychain persistence under the configured service name
    pub fn keychain(&self) -> &KeychainTokenPersistence {
        &self.keychain
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns one of the [`ApiError`] kinds if the call fails
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.executor.execute(&RequestDescriptor::get(path)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the body cannot be serialized, otherwise
    /// one of the [`ApiError`] kinds if the call fails
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let descriptor = RequestDescriptor::post(path).with_json(body)?;
        self.executor.execute(&descriptor).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post)
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let descriptor = RequestDescriptor::put(path).with_json(body)?;
        self.executor.execute(&descriptor).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// Returns one of the [`ApiError`] kinds if the call fails
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.executor.execute(&RequestDescriptor::delete(path)).await
    }

    /// Execute an arbitrary descriptor and decode the body as `T`
    ///
    /// # Errors
    ///
    /// Returns one of the [`ApiError`] kinds if the call fails
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        self.executor.execute(descriptor).await
    }

    /// Execute an arbitrary descriptor without decoding the body
    ///
    /// # Errors
    ///
    /// Returns one of the [`ApiError`] kinds if the call fails
    pub async fn execute_raw(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<TransportResponse, ApiError> {
        self.executor.execute_raw(descriptor).await
    }

    /// Install tokens obtained by the login flow
    pub fn login(&self, tokens: TokenPair) {
        self.store.login(tokens);
    }

    /// Forget the current tokens
    pub fn logout(&self) {
        self.store.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Load persisted tokens into the store
    ///
    /// # Errors
    ///
    /// Propagates failures of the persistence backend
    pub async fn hydrate(&self, persistence: &dyn TokenPersistence) -> Result<bool, KeywayError> {
        self.store.hydrate(persistence).await
    }

    /// Load tokens persisted under `config.keychain_service`
    ///
    /// # Errors
    ///
    /// Returns `KeywayError::Persistence` if the keychain cannot be read
    pub async fn hydrate_from_keychain(&self) -> Result<bool, KeywayError> {
        self.store.hydrate(&self.keychain).await
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    connectivity: Option<Arc<dyn ConnectivityGate>>,
    token_store: Option<Arc<TokenStore>>,
}

impl ApiClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default reqwest transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the connectivity gate (defaults to [`AlwaysReachable`])
    pub fn connectivity(mut self, gate: Arc<dyn ConnectivityGate>) -> Self {
        self.connectivity = Some(gate);
        self
    }

    /// Share an existing token store
    pub fn token_store(mut self, store: Arc<TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns `KeywayError::Config` if the configuration is invalid or the
    /// default transport cannot be created
    pub fn build(self) -> Result<ApiClient, KeywayError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };
        let gate: Arc<dyn ConnectivityGate> =
            self.connectivity.unwrap_or_else(|| Arc::new(AlwaysReachable));
        let store = self.token_store.unwrap_or_default();

        let coordinator =
            RefreshCoordinator::new(&config, Arc::clone(&store), Arc::clone(&transport))?;
        let executor = RequestExecutor::new(
            &config,
            gate,
            transport,
            Arc::clone(&store),
            coordinator.clone(),
        );

        let keychain = KeychainTokenPersistence::new(config.keychain_service.as_str());

        info!(base_url = %config.base_url, "API client ready");

        Ok(ApiClient { config, store, coordinator, executor, keychain })
    }
}
