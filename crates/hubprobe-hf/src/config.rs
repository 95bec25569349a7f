//! Public configuration for the Hub client.
//!
//! This module provides a stable public API for configuring the client.
//! The internal config is derived from this.

use std::time::Duration;

/// Default Hub endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Default cap for a single raw file.
pub const DEFAULT_MAX_RAW_BYTES: u64 = 10 * 1024 * 1024;

/// Environment variables consulted by [`HfClientConfig::from_env`], in order.
const TOKEN_VARS: [&str; 2] = ["HF_TOKEN", "HUGGING_FACE_HUB_TOKEN"];
const ENDPOINT_VAR: &str = "HF_ENDPOINT";

/// Configuration for the Hub client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use hubprobe_hf::HfClientConfig;
/// use std::time::Duration;
///
/// let config = HfClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct HfClientConfig {
    /// Hub endpoint, without a trailing slash
    pub(crate) endpoint: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Optional authentication token for private or gated repositories
    pub(crate) token: Option<String>,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    /// Cap for a single raw file body
    pub(crate) max_raw_bytes: u64,
}

impl Default for HfClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("hubprobe/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            token: None,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            max_raw_bytes: DEFAULT_MAX_RAW_BYTES,
        }
    }
}

impl HfClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the token and endpoint taken from the environment.
    ///
    /// Reads `HF_TOKEN` (falling back to `HUGGING_FACE_HUB_TOKEN`) and `HF_ENDPOINT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new()
            .with_optional_token(TOKEN_VARS.iter().copied().find_map(non_empty));
        if let Some(endpoint) = non_empty(ENDPOINT_VAR) {
            config = config.with_endpoint(endpoint);
        }
        config
    }

    /// Set the Hub endpoint.
    ///
    /// Defaults to `https://huggingface.co`. A trailing slash is trimmed.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an authentication token for private or gated repositories.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an optional authentication token.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the cap for a single raw file.
    ///
    /// Defaults to 10 MiB.
    #[must_use]
    pub const fn with_max_raw_bytes(mut self, max: u64) -> Self {
        self.max_raw_bytes = max;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = HfClientConfig::new();
        assert_eq!(config.endpoint, "https://huggingface.co");
        assert!(config.user_agent.starts_with("hubprobe/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token.is_none());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay, Duration::from_millis(500));
        assert_eq!(config.max_raw_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_builder_pattern() {
        let config = HfClientConfig::new()
            .with_endpoint("https://mirror.example/")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(60))
            .with_token("secret")
            .with_max_retries(5)
            .with_max_raw_bytes(1024);

        assert_eq!(config.endpoint(), "https://mirror.example");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.token, Some("secret".to_string()));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.max_raw_bytes, 1024);
    }

    #[test]
    fn test_optional_token() {
        let with_token = HfClientConfig::new().with_optional_token(Some("token".to_string()));
        assert!(with_token.has_token());

        let without_token = HfClientConfig::new().with_optional_token(None);
        assert!(!without_token.has_token());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("HF_TOKEN", ""),
            ("HUGGING_FACE_HUB_TOKEN", "hf_legacy"),
            ("HF_ENDPOINT", "http://localhost:8080/"),
        ]
        .into_iter()
        .collect();
        let config = HfClientConfig::from_lookup(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.token.as_deref(), Some("hf_legacy"));
        assert_eq!(config.endpoint, "http://localhost:8080");

        let config = HfClientConfig::from_lookup(|_| None);
        assert!(config.token.is_none());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
