//! Shared helpers for `keyway-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use keyway_domain::{ClientConfig, TokenPair};
use keyway_infra::{ApiClient, ReachabilityFlag};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Body the refresh endpoint answers with.
pub fn refresh_body(access: &str, refresh: &str) -> Value {
    json!({
        "resultCode": 0,
        "resultMessage": "success",
        "status": 200,
        "data": { "token": { "appToken": access, "refreshToken": refresh } }
    })
}

/// Client pointed at `server`, logged in with `tokens`.
pub fn client_for(server: &MockServer, tokens: TokenPair) -> ApiClient {
    let client = ApiClient::new(ClientConfig::with_base_url(server.uri()))
        .expect("client should build for mock server");
    client.login(tokens);
    client
}

/// Client whose connectivity gate is driven by the returned flag.
pub fn client_with_flag(server: &MockServer, tokens: TokenPair) -> (ApiClient, Arc<ReachabilityFlag>) {
    let flag = Arc::new(ReachabilityFlag::with_status(true));
    let client = ApiClient::builder()
        .config(ClientConfig::with_base_url(server.uri()))
        .connectivity(flag.clone())
        .build()
        .expect("client should build for mock server");
    client.login(tokens);
    (client, flag)
}
