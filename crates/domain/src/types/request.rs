//! Immutable description of one logical API call

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::ACCESS_TOKEN_HEADER;
use crate::errors::ApiError;
use crate::impl_wire_name_conversions;

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_wire_name_conversions!(Verb {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Patch => "PATCH",
    Delete => "DELETE",
});

/// One logical call: path, verb, headers and optional body.
///
/// Descriptors are never mutated after construction. Every builder method
/// consumes `self` and returns a new value, and [`with_auth_token`] is how the
/// executor derives the copy it actually sends.
///
/// Header names are unique ignoring ASCII case; setting a header that already
/// exists replaces it.
///
/// [`with_auth_token`]: RequestDescriptor::with_auth_token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    path: String,
    method: Verb,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Verb, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialise `payload` as the JSON body.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidPayload` if the payload cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| ApiError::InvalidPayload(format!("Failed to serialize body: {e}")))?;
        Ok(self.with_body(body))
    }

    /// Override the configured request timeout for this call only.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Copy of this descriptor authenticated with `token`.
    #[must_use]
    pub fn with_auth_token(&self, token: &str) -> Self {
        self.clone().with_header(ACCESS_TOKEN_HEADER, token)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Verb {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Header value looked up ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_wire_names() {
        assert_eq!(Verb::Post.to_string(), "POST");
        assert_eq!("delete".parse::<Verb>().unwrap(), Verb::Delete);
        assert!("TRACE".parse::<Verb>().is_err());
    }

    #[test]
    fn header_names_stay_unique_ignoring_case() {
        let request = RequestDescriptor::get("/task/list")
            .with_header("X-Access-Token", "old")
            .with_header("x-access-token", "new");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("X-ACCESS-TOKEN"), Some("new"));
    }

    #[test]
    fn with_auth_token_leaves_original_untouched() {
        let original = RequestDescriptor::get("/task/list").with_header("Accept", "json");
        let authed = original.with_auth_token("T2");

        assert_eq!(original.header(ACCESS_TOKEN_HEADER), None);
        assert_eq!(authed.header(ACCESS_TOKEN_HEADER), Some("T2"));
        assert_eq!(authed.header("accept"), Some("json"));
        assert_eq!(authed.path(), original.path());
    }

    #[test]
    fn with_json_encodes_body() {
        #[derive(Serialize)]
        struct Register<'a> {
            name: &'a str,
        }

        let request = RequestDescriptor::post("/user/register")
            .with_json(&Register { name: "ana" })
            .unwrap();
        assert_eq!(request.body(), Some(br#"{"name":"ana"}"#.as_slice()));
        assert_eq!(request.method(), Verb::Post);
    }
}
