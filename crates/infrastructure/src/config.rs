//! Client configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, the
//! `SECRETLY_*` environment variables, and explicit overrides (CLI flags).

use std::time::Duration;

use url::Url;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the API root.
pub const BASE_URL_VAR: &str = "SECRETLY_BASE_URL";

/// Environment variable overriding the timeout, in whole seconds.
pub const TIMEOUT_VAR: &str = "SECRETLY_TIMEOUT_SECS";

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The timeout is not a positive number of seconds.
    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Settings of the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("Secretly/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a `SECRETLY_*` variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;
            config = config.with_timeout_secs(secs)?;
        }
        Ok(config)
    }

    /// Replaces the base URL.
    ///
    /// # Errors
    /// Returns an error unless `value` is an absolute http(s) URL.
    pub fn with_base_url(mut self, value: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(value)?;
        Ok(self)
    }

    /// Replaces the timeout.
    ///
    /// # Errors
    /// Returns an error if `secs` is zero.
    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidTimeout(secs.to_string()));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }

    /// Timeout in milliseconds, for error reporting.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path"));
    }
    Ok(url)
}
