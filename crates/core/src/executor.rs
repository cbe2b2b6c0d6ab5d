//! Request executor
//!
//! Turns a [`RequestDescriptor`] plus the current access token into one
//! transport call, interprets the response, and on 401 hands off to the
//! [`RefreshCoordinator`]. A logical call is retried at most once, and only
//! after a successful refresh; the retried attempt's result is final.

use std::sync::Arc;
use std::time::Duration;

use keyway_domain::constants::{APPLICATION_JSON, CONTENT_TYPE_HEADER};
use keyway_domain::{ApiError, ClientConfig, RequestDescriptor};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::ports::{
    ConnectivityGate, Transport, TransportError, TransportRequest, TransportResponse,
};
use crate::refresh::RefreshCoordinator;
use crate::token_store::TokenStore;

const UNAUTHORIZED: u16 = 401;
const NO_CONTENT: u16 = 204;
const RESET_CONTENT: u16 = 205;

/// Executes logical calls against the API.
pub struct RequestExecutor {
    base_url: String,
    request_timeout: Duration,
    gate: Arc<dyn ConnectivityGate>,
    transport: Arc<dyn Transport>,
    store: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
}

impl RequestExecutor {
    /// Wire an executor from its ports and the shared refresh state.
    pub fn new(
        config: &ClientConfig,
        gate: Arc<dyn ConnectivityGate>,
        transport: Arc<dyn Transport>,
        store: Arc<TokenStore>,
        coordinator: RefreshCoordinator,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout(),
            gate,
            transport,
            store,
            coordinator,
        }
    }

    /// Store read for every outgoing request.
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Coordinator consulted on 401.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Execute `descriptor` and decode the 2xx body as `T`.
    ///
    /// 204/205 and empty 2xx bodies decode as JSON `null`, so `T = ()` or an
    /// `Option` works for endpoints without a payload.
    ///
    /// # Errors
    /// One of the [`ApiError`] kinds; never `AuthExpired`.
    #[instrument(
        skip(self, descriptor),
        fields(method = %descriptor.method(), path = %descriptor.path())
    )]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(descriptor).await?;
        decode(&response)
    }

    /// Execute `descriptor` without decoding the body.
    ///
    /// # Errors
    /// Same as [`execute`](Self::execute) minus `InvalidPayload`.
    #[instrument(
        skip(self, descriptor),
        fields(method = %descriptor.method(), path = %descriptor.path())
    )]
    pub async fn execute_raw(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<TransportResponse, ApiError> {
        self.dispatch(descriptor).await
    }

    async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<TransportResponse, ApiError> {
        if !self.gate.is_reachable() {
            warn!("Network unreachable, request not sent");
            return Err(ApiError::NoConnectivity);
        }

        let url = resolve_url(&self.base_url, descriptor.path())?;
        let sent_token = self.store.access_token();

        let first = self.send(descriptor, &url, sent_token.as_deref()).await?;
        match check_status(first) {
            Err(ApiError::AuthExpired { code }) => {
                debug!(code, "Access token rejected, awaiting refresh");
                let fresh = self.coordinator.await_token_newer_than(sent_token.as_deref()).await?;

                let retry = self.send(descriptor, &url, Some(&fresh)).await?;
                check_status(retry).map_err(|err| match err {
                    ApiError::AuthExpired { code } => ApiError::ServerError {
                        code,
                        message: "request rejected again after token refresh".into(),
                    },
                    other => other,
                })
            }
            other => other,
        }
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
        token: Option<&str>,
    ) -> Result<TransportResponse, ApiError> {
        let outgoing = match token {
            Some(token) => descriptor.with_auth_token(token),
            None => descriptor.clone(),
        };
        let outgoing = if outgoing.header(CONTENT_TYPE_HEADER).is_some() {
            outgoing
        } else {
            outgoing.with_header(CONTENT_TYPE_HEADER, APPLICATION_JSON)
        };

        let timeout = descriptor.timeout().unwrap_or(self.request_timeout);
        let request = TransportRequest {
            method: outgoing.method(),
            url: url.clone(),
            headers: outgoing.headers().clone(),
            body: outgoing.body().map(<[u8]>::to_vec),
            timeout,
        };

        debug!(method = %request.method, url = %request.url, "Sending request");

        match tokio::time::timeout(timeout, self.transport.perform(request)).await {
            Ok(Ok(response)) => {
                debug!(status = response.status, "Received response");
                Ok(response)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Transport failure");
                Err(ApiError::transport(err.to_string()))
            }
            Err(_) => {
                warn!(?timeout, "Request timed out");
                Err(ApiError::transport(TransportError::Timeout.to_string()))
            }
        }
    }
}

/// Join base URL and path, rejecting anything that is not an http(s) URL.
fn resolve_url(base_url: &str, path: &str) -> Result<Url, ApiError> {
    let separator = if path.is_empty() || path.starts_with('/') { "" } else { "/" };
    let raw = format!("{}{}{}", base_url.trim_end_matches('/'), separator, path);

    let url = Url::parse(&raw).map_err(|e| ApiError::BadUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(ApiError::BadUrl(format!("{raw}: not an http(s) URL"))),
    }
}

fn check_status(response: TransportResponse) -> Result<TransportResponse, ApiError> {
    let status = response.status;
    match status {
        _ if response.is_success() => Ok(response),
        UNAUTHORIZED => Err(ApiError::AuthExpired { code: UNAUTHORIZED }),
        code => Err(ApiError::ServerError {
            code,
            message: String::from_utf8_lossy(&response.body).into_owned(),
        }),
    }
}

fn decode<T: DeserializeOwned>(response: &TransportResponse) -> Result<T, ApiError> {
    let no_content = matches!(response.status, NO_CONTENT | RESET_CONTENT)
        || response.body.iter().all(u8::is_ascii_whitespace);

    let decoded = if no_content {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };

    decoded.map_err(|e| ApiError::InvalidPayload(format!("Failed to parse response: {e}")))
}
