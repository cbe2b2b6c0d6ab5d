//! Wire-level constants shared by every layer.

/// Header carrying the access token on authenticated requests, and the
/// refresh token on the refresh call itself.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Default path of the token-refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refreshToken";

// Persisted-state keys (hydration source only)
pub const PERSISTED_ACCESS_TOKEN_KEY: &str = "accessToken";
pub const PERSISTED_REFRESH_TOKEN_KEY: &str = "refreshToken";

pub const DEFAULT_KEYCHAIN_SERVICE: &str = "keyway.tokens";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

/// Status code used for failures that never produced an HTTP response.
pub const TRANSPORT_FAILURE_CODE: u16 = 0;

pub const DEVELOPMENT_BASE_URL: &str = "http://175.136.236.153:9108";
pub const PRODUCTION_BASE_URL: &str = "http://175.136.236.153:9108";
