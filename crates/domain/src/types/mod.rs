//! Domain types

pub mod refresh;
pub mod request;
pub mod token;

pub use refresh::{ApiEnvelope, RefreshTokenData, RefreshTokenResponse, RefreshedTokens};
pub use request::{RequestDescriptor, Verb};
pub use token::TokenPair;
