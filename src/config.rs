//! Client configuration
//!
//! [`ClientConfig`] is plain serde data so it can live in an application's
//! config file; [`ClientConfig::from_env`] covers the common deployment case.

use crate::logging::{log_debug, log_warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "TIMETABLE_API_URL";
/// Environment variable holding the request timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "TIMETABLE_API_TIMEOUT_SECS";

/// Configuration problems detected while building a client.
///
/// These are construction-time failures and never come out of a request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TIMETABLE_API_URL` and `TIMETABLE_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = url;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let seconds = raw.trim().parse::<u64>().map_err(|e| {
                log_warn!(variable = TIMEOUT_ENV, value = %raw, "Unparsable timeout in environment");
                ConfigError::InvalidTimeout(format!("{TIMEOUT_ENV}={raw}: {e}"))
            })?;
            config.timeout = Duration::from_secs(seconds);
        }

        log_debug!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            "Loaded client configuration from environment"
        );

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBaseUrl`] if the URL is empty or not http(s)
    /// - [`ConfigError::InvalidTimeout`] if the timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "base URL is empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "base URL must start with http:// or https://".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
