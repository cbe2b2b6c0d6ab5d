//! Single-flight token refresh
//!
//! Many executors may see 401 at the same moment. The first one to reach the
//! coordinator while it is idle starts the one refresh call; everyone else
//! arriving before that call resolves joins the same cycle as a waiter. The
//! call runs on its own task, so a waiter that gives up (its future is
//! dropped) never aborts the refresh the others are waiting on.
//!
//! Ordering: on success the token store is written before the state returns
//! to `Idle` and before any waiter is released.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyway_domain::constants::{ACCESS_TOKEN_HEADER, APPLICATION_JSON, CONTENT_TYPE_HEADER};
use keyway_domain::{ClientConfig, KeywayError, RefreshError, RefreshTokenResponse, Verb};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use super::state::{release, RefreshOutcome, RefreshPhase, RefreshState};
use crate::ports::{Transport, TransportError, TransportRequest};
use crate::token_store::TokenStore;

/// Owner of the refresh protocol. Cheap to clone; clones share one state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<TokenStore>,
    transport: Arc<dyn Transport>,
    refresh_url: Url,
    timeout: Duration,
    state: Mutex<RefreshState>,
    refresh_calls: AtomicU64,
}

enum Registration {
    Ready(String),
    Wait(oneshot::Receiver<RefreshOutcome>),
    Start {
        receiver: oneshot::Receiver<RefreshOutcome>,
        cycle: RefreshCycle,
        refresh_token: String,
    },
}

impl RefreshCoordinator {
    /// Create a coordinator refreshing against `config.base_url` +
    /// `config.refresh_path`.
    ///
    /// # Errors
    /// Returns `KeywayError::Config` if the refresh URL cannot be built.
    pub fn new(
        config: &ClientConfig,
        store: Arc<TokenStore>,
        transport: Arc<dyn Transport>,
    ) -> keyway_domain::Result<Self> {
        let raw = format!("{}{}", config.base_url.trim_end_matches('/'), config.refresh_path);
        let refresh_url = Url::parse(&raw)
            .map_err(|e| KeywayError::Config(format!("Invalid refresh URL '{raw}': {e}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                transport,
                refresh_url,
                timeout: config.refresh_timeout(),
                state: Mutex::new(RefreshState::Idle),
                refresh_calls: AtomicU64::new(0),
            }),
        })
    }

    /// Wait for a refreshed access token.
    ///
    /// Starts a refresh if none is in flight, otherwise joins the one that
    /// is. Fails fast with [`RefreshError::MissingRefreshToken`] and no
    /// network call when there is no refresh token to use.
    pub async fn await_valid_token(&self) -> RefreshOutcome {
        self.await_token_newer_than(None).await
    }

    /// Like [`await_valid_token`], for a caller whose request was rejected
    /// while carrying `stale`.
    ///
    /// If the store already holds a different access token, a refresh cycle
    /// closed between that rejection and this call; the current token is
    /// returned without starting another one.
    ///
    /// [`await_valid_token`]: RefreshCoordinator::await_valid_token
    pub async fn await_token_newer_than(&self, stale: Option<&str>) -> RefreshOutcome {
        let receiver = match self.register(stale)? {
            Registration::Ready(token) => return Ok(token),
            Registration::Wait(receiver) => receiver,
            Registration::Start { receiver, cycle, refresh_token } => {
                // Must run outside the state lock; `RefreshCycle::drop` takes it.
                tokio::spawn(cycle.run(refresh_token));
                receiver
            }
        };

        receiver.await.unwrap_or_else(|_| {
            Err(RefreshError::Transport("refresh task ended without an outcome".into()))
        })
    }

    /// Current state, for diagnostics.
    pub fn phase(&self) -> RefreshPhase {
        self.inner.state.lock().phase()
    }

    /// Number of refresh calls issued so far.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    // The whole check-and-transition happens under one lock acquisition.
    fn register(&self, stale: Option<&str>) -> Result<Registration, RefreshError> {
        let mut state = self.inner.state.lock();

        if let Some(receiver) = state.join() {
            debug!(phase = ?state.phase(), "Joined in-flight token refresh");
            return Ok(Registration::Wait(receiver));
        }

        let tokens = self.inner.store.snapshot();
        if let (Some(stale), Some(current)) = (stale, tokens.access_token()) {
            if stale != current {
                debug!("Access token already refreshed, skipping refresh call");
                return Ok(Registration::Ready(current.to_owned()));
            }
        }

        let Some(refresh_token) = tokens.refresh_token().map(str::to_owned) else {
            warn!("Token refresh requested without a refresh token");
            return Err(RefreshError::MissingRefreshToken);
        };

        let receiver = state.begin();
        self.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
        debug!(url = %self.inner.refresh_url, "Starting token refresh");

        let cycle = RefreshCycle { inner: Arc::clone(&self.inner), outcome: None };
        Ok(Registration::Start { receiver, cycle, refresh_token })
    }
}

/// One refresh call. Dropping it always closes the cycle, so waiters are
/// released even if the task is aborted mid-call.
struct RefreshCycle {
    inner: Arc<Inner>,
    outcome: Option<RefreshOutcome>,
}

impl RefreshCycle {
    async fn run(mut self, refresh_token: String) {
        let outcome = match self.inner.call_refresh_endpoint(&refresh_token).await {
            Ok(tokens) => {
                let access = tokens.access_token().map(str::to_owned).unwrap_or_default();
                self.inner.store.replace(tokens);
                info!("Access token refreshed");
                Ok(access)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                Err(err)
            }
        };
        self.outcome = Some(outcome);
    }
}

impl Drop for RefreshCycle {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| {
            Err(RefreshError::Transport("refresh task aborted".into()))
        });
        let waiters = self.inner.state.lock().finish();
        let delivered = release(waiters, &outcome);
        debug!(delivered, success = outcome.is_ok(), "Token refresh cycle closed");
    }
}

impl Inner {
    async fn call_refresh_endpoint(
        &self,
        refresh_token: &str,
    ) -> Result<keyway_domain::TokenPair, RefreshError> {
        let mut headers = BTreeMap::new();
        headers.insert(ACCESS_TOKEN_HEADER.to_string(), refresh_token.to_string());
        headers.insert(CONTENT_TYPE_HEADER.to_string(), APPLICATION_JSON.to_string());

        let request = TransportRequest {
            method: Verb::Post,
            url: self.refresh_url.clone(),
            headers,
            body: None,
            timeout: self.timeout,
        };

        let response = match tokio::time::timeout(self.timeout, self.transport.perform(request))
            .await
        {
            Err(_) | Ok(Err(TransportError::Timeout)) => return Err(RefreshError::Timeout),
            Ok(Err(err)) => return Err(RefreshError::Transport(err.to_string())),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(RefreshError::Status(response.status));
        }

        RefreshTokenResponse::from_slice(&response.body)?.into_token_pair()
    }
}
