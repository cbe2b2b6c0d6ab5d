//! Wire types of the token-refresh endpoint and the standard response
//! envelope

use serde::{Deserialize, Serialize};

use super::token::TokenPair;
use crate::errors::RefreshError;

/// Token block nested under `data.token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    #[serde(default)]
    pub app_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenData {
    #[serde(default)]
    pub token: Option<RefreshedTokens>,
}

/// Body returned by `POST /auth/refreshToken`.
///
/// ```json
/// {"resultCode": 0, "resultMessage": "ok", "status": 200,
///  "data": {"token": {"appToken": "T2", "refreshToken": "R2"}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    #[serde(default)]
    pub result_code: Option<i16>,
    #[serde(default)]
    pub result_message: Option<String>,
    #[serde(default)]
    pub status: Option<i16>,
    #[serde(default)]
    pub data: Option<RefreshTokenData>,
}

impl RefreshTokenResponse {
    /// Decode a raw response body.
    ///
    /// # Errors
    /// Returns `RefreshError::MalformedResponse` if the body is not JSON of
    /// this shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, RefreshError> {
        serde_json::from_slice(body).map_err(|e| RefreshError::MalformedResponse(e.to_string()))
    }

    /// The new token pair, provided both tokens are present and non-empty.
    ///
    /// # Errors
    /// Returns `RefreshError::MalformedResponse` naming the missing field.
    pub fn into_token_pair(self) -> Result<TokenPair, RefreshError> {
        let tokens = self
            .data
            .and_then(|data| data.token)
            .ok_or_else(|| RefreshError::MalformedResponse("missing data.token".into()))?;

        let app_token = tokens
            .app_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RefreshError::MalformedResponse("missing appToken".into()))?;
        let refresh_token = tokens
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RefreshError::MalformedResponse("missing refreshToken".into()))?;

        Ok(TokenPair::new(app_token, refresh_token))
    }
}

/// Standard wrapper most endpoints answer with.
///
/// Decode a call as `ApiEnvelope<T>` to get at `resultCode`/`resultMessage`
/// alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub result_code: Option<i32>,
    #[serde(default)]
    pub result_message: Option<String>,
    #[serde(default)]
    pub status: Option<i16>,
    pub data: Option<T>,
}
