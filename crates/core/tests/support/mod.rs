//! Shared test helpers for `keyway-core` integration tests.
//!
//! `FakeApi` plays the server side of the token protocol in memory: it
//! accepts exactly one access token at a time and rotates it when the refresh
//! endpoint is called, so tests can assert on what actually went over the
//! wire.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use keyway_core::{
    ConnectivityGate, RefreshCoordinator, RequestExecutor, TokenStore, Transport, TransportError,
    TransportRequest, TransportResponse,
};
use keyway_domain::constants::{ACCESS_TOKEN_HEADER, DEFAULT_REFRESH_PATH};
use keyway_domain::{ClientConfig, TokenPair};

pub const BASE_URL: &str = "http://api.test";

/// What the fake refresh endpoint does when called.
#[derive(Debug, Clone)]
pub enum RefreshScript {
    /// Rotate to the given pair.
    Issue { access: String, refresh: String },
    /// Answer with a bare status code.
    Status(u16),
    /// Answer 200 with an arbitrary body.
    Body(String),
    /// Never answer.
    Hang,
}

impl RefreshScript {
    pub fn issue(access: &str, refresh: &str) -> Self {
        Self::Issue { access: access.into(), refresh: refresh.into() }
    }
}

/// In-memory API accepting a single valid access token.
pub struct FakeApi {
    valid_token: Mutex<String>,
    refresh: RefreshScript,
    refresh_delay: Duration,
    reject_everything: AtomicBool,
    hang_requests: AtomicBool,
    failure: Option<TransportError>,
    requests: Mutex<Vec<TransportRequest>>,
    refresh_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new(valid_token: &str, refresh: RefreshScript) -> Self {
        Self {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh,
            refresh_delay: Duration::ZERO,
            reject_everything: AtomicBool::new(false),
            hang_requests: AtomicBool::new(false),
            failure: None,
            requests: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Hold every refresh answer back for `delay`, so concurrent callers
    /// pile up behind one cycle.
    pub fn delaying_refresh(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Every data request gets 401, whatever token it carries.
    pub fn rejecting_everything(self) -> Self {
        self.reject_everything.store(true, Ordering::SeqCst);
        self
    }

    /// Data requests never get an answer. The refresh endpoint is unaffected.
    pub fn hanging_requests(self) -> Self {
        self.hang_requests.store(true, Ordering::SeqCst);
        self
    }

    /// Every round trip fails before reaching the server.
    pub fn failing_with(mut self, error: TransportError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to anything but the refresh endpoint.
    pub fn data_requests(&self) -> Vec<TransportRequest> {
        self.requests().into_iter().filter(|r| r.url.path() != DEFAULT_REFRESH_PATH).collect()
    }

    async fn answer_refresh(&self) -> Result<TransportResponse, TransportError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        match &self.refresh {
            RefreshScript::Issue { access, refresh } => {
                *self.valid_token.lock().unwrap() = access.clone();
                let body = serde_json::json!({
                    "resultCode": 0,
                    "resultMessage": "success",
                    "status": 200,
                    "data": { "token": { "appToken": access, "refreshToken": refresh } }
                });
                Ok(TransportResponse::new(200, body.to_string()))
            }
            RefreshScript::Status(code) => Ok(TransportResponse::new(*code, "")),
            RefreshScript::Body(body) => Ok(TransportResponse::new(200, body.clone())),
            RefreshScript::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        if request.url.path() == DEFAULT_REFRESH_PATH {
            return self.answer_refresh().await;
        }

        if self.hang_requests.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }

        let presented = request.headers.get(ACCESS_TOKEN_HEADER).cloned().unwrap_or_default();
        let accepted = *self.valid_token.lock().unwrap() == presented;
        if accepted && !self.reject_everything.load(Ordering::SeqCst) {
            Ok(TransportResponse::new(200, r#"{"items":["write spec","ship it"]}"#))
        } else {
            Ok(TransportResponse::new(401, r#"{"message":"token expired"}"#))
        }
    }
}

/// Connectivity gate with a fixed answer.
pub struct StaticGate(pub bool);

impl ConnectivityGate for StaticGate {
    fn is_reachable(&self) -> bool {
        self.0
    }
}

/// Fully wired executor around a `FakeApi`.
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<TokenStore>,
    pub coordinator: RefreshCoordinator,
    pub executor: Arc<RequestExecutor>,
}

impl Harness {
    pub fn new(tokens: TokenPair, api: FakeApi) -> Self {
        Self::build(ClientConfig::with_base_url(BASE_URL), tokens, api, true)
    }

    pub fn offline(tokens: TokenPair, api: FakeApi) -> Self {
        Self::build(ClientConfig::with_base_url(BASE_URL), tokens, api, false)
    }

    pub fn build(config: ClientConfig, tokens: TokenPair, api: FakeApi, reachable: bool) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(TokenStore::with_tokens(tokens));
        let transport: Arc<dyn Transport> = api.clone();
        let coordinator = RefreshCoordinator::new(&config, Arc::clone(&store), Arc::clone(&transport))
            .expect("refresh URL builds from test config");
        let executor = RequestExecutor::new(
            &config,
            Arc::new(StaticGate(reachable)),
            transport,
            Arc::clone(&store),
            coordinator.clone(),
        );

        Self { api, store, coordinator, executor: Arc::new(executor) }
    }
}
