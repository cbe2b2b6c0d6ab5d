//! Application-facing API client
//!
//! Wires configuration, transport, connectivity gate, token store, refresh
//! coordinator and executor into one handle.

pub mod client;

pub use client::{ApiClient, ApiClientBuilder};
