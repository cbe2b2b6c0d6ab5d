//! # Keyway Domain
//!
//! Domain types and error taxonomy for the Keyway authenticated API client.
//!
//! This crate contains:
//! - Token and request descriptor types
//! - Wire types of the token-refresh endpoint
//! - The per-call error taxonomy ([`ApiError`]) and ambient errors
//! - Client configuration and constants
//!
//! ## Architecture
//! - No dependencies on other Keyway crates
//! - No I/O, no async runtime

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
