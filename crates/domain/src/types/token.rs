//! Access/refresh token pair

use std::fmt;

use serde::{Deserialize, Serialize};

/// The credentials the client authenticates with.
///
/// Both tokens are absent until the first login. A pair is only ever replaced
/// as a whole; there is no setter for a single field.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenPair {
    /// A pair carrying both tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Build a pair from possibly-missing values; empty strings count as
    /// missing.
    pub fn from_parts(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// The logged-out state.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token().is_none() && self.refresh_token().is_none()
    }
}

// Token values never reach logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pair_has_no_tokens() {
        let pair = TokenPair::empty();
        assert!(pair.is_empty());
        assert!(!pair.has_refresh_token());
        assert_eq!(pair.access_token(), None);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let pair = TokenPair::new("", "");
        assert!(pair.is_empty());

        let pair = TokenPair::from_parts(Some("T1".into()), Some(String::new()));
        assert_eq!(pair.access_token(), Some("T1"));
        assert!(!pair.has_refresh_token());
    }

    #[test]
    fn debug_output_redacts_values() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(TokenPair::new("T1", "R1")).unwrap();
        assert_eq!(json["accessToken"], "T1");
        assert_eq!(json["refreshToken"], "R1");
    }
}
