//! Collaborator API client configuration.
//!
//! One base URL covers every resource the client touches. Defaults point at a
//! local development API. Override via environment variables or explicit
//! construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL of the collaborator API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of transport retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for connecting to the collaborator API.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL including the version prefix, e.g. `http://localhost:8000/api/v1`.
    pub base_url: Url,
    /// Optional bearer token. Token issuance is handled elsewhere.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Transport retries after the first attempt (0 disables retry).
    pub max_retries: u32,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ApiConfig {
    /// Build a configuration for an explicit base URL with default timeout
    /// and retry settings.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ATTEST_API_URL` (default: `http://localhost:8000/api/v1`)
    /// - `ATTEST_API_TOKEN` (optional)
    /// - `ATTEST_TIMEOUT_SECS` (default: 30)
    /// - `ATTEST_MAX_RETRIES` (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("ATTEST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_token = std::env::var("ATTEST_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            base_url: parse_url("ATTEST_API_URL", &raw)?,
            api_token,
            timeout_secs: env_number("ATTEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            max_retries: env_number("ATTEST_MAX_RETRIES", DEFAULT_MAX_RETRIES),
        })
    }

    /// Create a configuration pointing at a local server (for testing).
    ///
    /// Short timeout, no retries, no token.
    pub fn local(port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("localhost", &format!("http://127.0.0.1:{port}/api/v1"))?,
            api_token: None,
            timeout_secs: 5,
            max_retries: 0,
        })
    }

    /// Replace the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    /// Base URL as a string without a trailing slash, ready for path joins.
    pub(crate) fn base(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            source.to_string(),
            format!("unsupported scheme {other:?}"),
        )),
    }
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API token contains characters that cannot be sent in a header")]
    InvalidToken,
}
