//! Configuration types for the FRED client.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Public FRED REST root.
pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/";

/// Configuration for [`crate::FredClient`].
#[derive(Clone)]
pub struct FredConfig {
    /// Root of the FRED REST API. Endpoint paths are joined onto it.
    pub base_url: Url,
    /// FRED API key, sent as the `api_key` query field.
    pub api_key: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl FredConfig {
    /// Create a configuration rooted at `base_url` with default timeouts.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: normalize_base(base_url),
            api_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("fredmcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl Default for FredConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL"))
    }
}

// Hand-written so the key never reaches a log line.
impl fmt::Debug for FredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FredConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
