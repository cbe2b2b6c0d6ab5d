//! # Keyway Core
//!
//! Request dispatch, retry and token-refresh logic - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for transport, connectivity and persisted tokens
//! - The process-wide [`TokenStore`]
//! - The single-flight [`RefreshCoordinator`]
//! - The [`RequestExecutor`] that ties them together
//!
//! ## Architecture Principles
//! - Only depends on `keyway-domain`
//! - No HTTP client, keychain or platform code
//! - All external dependencies via traits

pub mod executor;
pub mod ports;
pub mod refresh;
pub mod token_store;

pub use executor::RequestExecutor;
pub use ports::{
    ConnectivityGate, TokenPersistence, Transport, TransportError, TransportRequest,
    TransportResponse,
};
pub use refresh::{RefreshCoordinator, RefreshPhase};
pub use token_store::TokenStore;
