//! HTTP transport built on reqwest

mod client;

pub use client::{HttpTransport, HttpTransportBuilder};
