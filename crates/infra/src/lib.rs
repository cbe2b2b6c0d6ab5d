//! # Keyway Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport (reqwest)
//! - Connectivity gate adapters
//! - Token persistence (platform keychain, in-memory)
//! - Configuration loading (environment, JSON, TOML)
//! - The [`ApiClient`] facade and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `keyway-core`
//! - Depends on `keyway-domain` and `keyway-core`
//! - Contains all "impure" code (I/O, platform APIs)

pub mod api;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod http;
pub mod keychain;
pub mod logging;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder};
pub use connectivity::{AlwaysReachable, PathInterface, ReachabilityFlag};
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use keychain::{InMemoryTokenPersistence, KeychainTokenPersistence};
