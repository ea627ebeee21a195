//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `from_env` reads the process environment; `from_lookup` takes any
//! key → value function so parsing can be exercised without touching
//! global state. The binary loads `.env` via `dotenvy` before calling in.

use std::time::Duration;

use crate::error::ErrorCode;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MOCK_DELAY_MS: u64 = 0;

pub const ENV_API_BASE_URL: &str = "AFROKEN_API_BASE_URL";
pub const ENV_USE_MOCK: &str = "AFROKEN_USE_MOCK";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "AFROKEN_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "AFROKEN_REQUEST_TIMEOUT_SECS";
pub const ENV_MOCK_DELAY_MS: &str = "AFROKEN_MOCK_DELAY_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment value could not be parsed.
    #[error("invalid value for {var}: '{value}'")]
    Parse { var: &'static str, value: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect_secs: u64,
    /// `None` leaves requests unbounded; a hung backend keeps the caller waiting.
    pub request_secs: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS, request_secs: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub use_mock: bool,
    pub timeouts: Timeouts,
    pub mock_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            use_mock: false,
            timeouts: Timeouts::default(),
            mock_delay_ms: DEFAULT_MOCK_DELAY_MS,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `AFROKEN_API_BASE_URL`: default `http://localhost:8000`
    /// - `AFROKEN_USE_MOCK`: `true`/`1`/`yes` forces the local answer table
    /// - `AFROKEN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `AFROKEN_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `AFROKEN_MOCK_DELAY_MS`: default 0
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup(ENV_API_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_API_BASE_URL.to_owned(), |v| normalize_base_url(&v));

        let use_mock = match lookup(ENV_USE_MOCK) {
            Some(raw) => parse_bool(ENV_USE_MOCK, &raw)?,
            None => false,
        };

        let connect_secs = parse_u64(ENV_CONNECT_TIMEOUT_SECS, lookup(ENV_CONNECT_TIMEOUT_SECS))?
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_secs = parse_u64(ENV_REQUEST_TIMEOUT_SECS, lookup(ENV_REQUEST_TIMEOUT_SECS))?;
        let mock_delay_ms = parse_u64(ENV_MOCK_DELAY_MS, lookup(ENV_MOCK_DELAY_MS))?.unwrap_or(DEFAULT_MOCK_DELAY_MS);

        Ok(Self { api_base_url, use_mock, timeouts: Timeouts { connect_secs, request_secs }, mock_delay_ms })
    }

    #[must_use]
    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    /// Build the shared HTTP client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(self.timeouts.connect_secs));
        if let Some(secs) = self.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))
    }
}

/// Trim whitespace and trailing slashes so paths can be appended with `/`.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Parse { var, value: raw.to_owned() }),
    }
}

fn parse_u64(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Parse { var, value: v }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
