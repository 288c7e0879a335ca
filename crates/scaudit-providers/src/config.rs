//! Risk-intelligence service configuration.
//!
//! Override via environment variables or explicit construction for tests.

use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the risk-intelligence service.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL, e.g. `https://risk.example.com`.
    pub base_url: Url,
    /// Optional bearer token.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Configuration for `base_url` with no token and the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Parse `base_url` and build a configuration.
    pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
        Url::parse(base_url)
            .map(Self::new)
            .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SCAUDIT_PROVIDER_URL` (required)
    /// - `SCAUDIT_PROVIDER_TOKEN` (optional)
    /// - `SCAUDIT_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SCAUDIT_PROVIDER_URL").map_err(|_| ConfigError::MissingUrl)?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("SCAUDIT_PROVIDER_URL".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: std::env::var("SCAUDIT_PROVIDER_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            timeout_secs: std::env::var("SCAUDIT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SCAUDIT_PROVIDER_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("provider token is not a valid header value")]
    InvalidToken,
}
