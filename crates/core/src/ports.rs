//! Port interfaces for the request pipeline
//!
//! These traits define the boundaries between the dispatch/refresh logic and
//! the infrastructure that performs I/O.
//!
//! # Example
//!
//! ```no_run
//! use keyway_core::ConnectivityGate;
//!
//! struct Offline;
//!
//! impl ConnectivityGate for Offline {
//!     fn is_reachable(&self) -> bool {
//!         false
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use keyway_domain::{Result, TokenPair, Verb};
use thiserror::Error;
use url::Url;

/// Answers whether the network is currently usable.
///
/// Polled synchronously before every request; must not have side effects.
pub trait ConnectivityGate: Send + Sync {
    /// `false` short-circuits the call with `NoConnectivity` before anything
    /// is sent.
    fn is_reachable(&self) -> bool;
}

/// A fully built request, ready for one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Verb,
    /// Absolute http(s) URL
    pub url: Url,
    /// Header name to value, including `x-access-token` when authenticated
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes, if any
    pub body: Option<Vec<u8>>,
    /// Upper bound for the whole round trip
    pub timeout: Duration,
}

/// Raw result of a round trip that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes, possibly empty
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A round trip that never produced an HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response within the request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure below HTTP
    #[error("transport failure: {0}")]
    Other(String),
}

/// Performs exactly one HTTP round trip. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` once and return whatever status came back.
    ///
    /// Non-2xx statuses are `Ok`; only failures that produced no status are
    /// `Err`.
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Read-only source the token store is hydrated from at startup.
#[async_trait]
pub trait TokenPersistence: Send + Sync {
    /// Load the persisted pair, `None` when nothing was ever stored.
    async fn load(&self) -> Result<Option<TokenPair>>;
}
