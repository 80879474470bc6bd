//! Adapter configuration and credential handling.
//!
//! Configuration is plain data: the endpoint base URL, an optional API key,
//! and the request timeout. [`RouterConfig::from_env`] reads the
//! `MODELROUTE_*` environment variables so a host deployment can configure
//! the integration without code changes.

use std::time::Duration;

/// Default routing endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.modelroute.ai";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

// ---------------------------------------------------------------------------

/// A routing-service API key.
///
/// Deliberately opaque: `Debug` and `Display` redact the value so the key
/// never lands in logs or error messages. Use [`ApiKey::expose`] only at the
/// point the request is signed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key string. Empty keys are representable but are treated
    /// as missing credentials by the client.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for request signing.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the wrapped key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("****")
    }
}

// ---------------------------------------------------------------------------

/// Configuration for [`crate::RouterClient`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Routing endpoint base URL, e.g. `https://api.modelroute.ai`.
    pub base_url: String,
    /// API key. `None` (or an empty key) makes every call fail with an
    /// authentication error before any traffic is issued.
    pub api_key: Option<ApiKey>,
    /// Whole-request timeout applied to the underlying HTTP client.
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RouterConfig {
    /// Builds a configuration from the environment:
    ///
    /// - `MODELROUTE_BASE_URL` — endpoint base URL (default
    ///   [`DEFAULT_BASE_URL`]).
    /// - `MODELROUTE_API_KEY` — API key (no default).
    /// - `MODELROUTE_TIMEOUT_MS` — request timeout in milliseconds
    ///   (default 30000).
    ///
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MODELROUTE_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("MODELROUTE_API_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .map(ApiKey::new),
            request_timeout: std::env::var("MODELROUTE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    /// Replaces the API key.
    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }
}
