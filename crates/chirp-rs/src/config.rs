//! Client configuration with sensible defaults.
//!
//! [`ClientConfig`] holds the settings the client and the default
//! [`ReqwestTransport`](crate::transport::ReqwestTransport) need. Build it
//! with [`Default`] plus `with_*` overrides, or from the environment with
//! [`ClientConfig::from_env`].

use std::time::Duration;

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Endpoint that returns the authenticated user.
pub const DEFAULT_CREDENTIALS_PATH: &str = "/1.1/account/verify_credentials.json";

/// Identifiers per request for batched lookups.
pub const MAX_USERS_PER_REQUEST: usize = 100;

pub const BASE_URL_ENV: &str = "CHIRP_BASE_URL";
pub const BEARER_TOKEN_ENV: &str = "CHIRP_BEARER_TOKEN";
pub const TIMEOUT_ENV: &str = "CHIRP_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin requests are resolved against. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// `User-Agent` header. Default: `"chirp-rs/<version>"`.
    pub user_agent: String,
    /// Whole-request timeout enforced by the transport. Default: 30s.
    pub timeout: Duration,
    /// Bearer token attached by the reqwest transport, if any.
    pub bearer_token: Option<String>,
    /// Path used to resolve the default identity.
    pub credentials_path: String,
    /// Chunk size for batched lookups. Default: [`MAX_USERS_PER_REQUEST`].
    pub batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("chirp-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            bearer_token: None,
            credentials_path: DEFAULT_CREDENTIALS_PATH.to_string(),
            batch_size: MAX_USERS_PER_REQUEST,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `CHIRP_BASE_URL`, `CHIRP_BEARER_TOKEN`, and
    /// `CHIRP_TIMEOUT_SECS` when set. An unparseable timeout keeps the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV) {
            config.base_url = url;
        }
        if let Some(token) = lookup(BEARER_TOKEN_ENV).filter(|t| !t.is_empty()) {
            config.bearer_token = Some(token);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).and_then(|s| s.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<String>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Set the lookup chunk size. Zero is bumped to one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }
}
