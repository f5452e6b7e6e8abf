//! Session backend client configuration.
//!
//! Points at a local backend by default. Override via environment variables
//! or explicit construction for staging and tests.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL of the session backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the session backend.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct IntakeApiConfig {
    /// Base URL of the session backend.
    pub base_url: Url,
    /// Optional bearer token. The reference backend accepts anonymous calls.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds. Every call is bounded by it.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IntakeApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl IntakeApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `INTAKE_API_URL` (default: `http://localhost:8000`)
    /// - `INTAKE_API_TOKEN` (optional)
    /// - `INTAKE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_url("INTAKE_API_URL", DEFAULT_API_URL)?;
        let api_token = std::env::var("INTAKE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);
        let timeout_secs = env_timeout("INTAKE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            base_url,
            api_token,
            timeout_secs,
        })
    }

    /// Configuration for an explicit base URL, no token, default timeout.
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

pub(crate) fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

pub(crate) fn env_timeout(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidTimeout(var.to_string(), raw)),
            Ok(secs) => Ok(secs),
        },
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout for {0}: {1:?} (expected a positive number of seconds)")]
    InvalidTimeout(String, String),
    #[error("API token is not a valid header value")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("INTAKE_NONEXISTENT_VAR_4711", DEFAULT_API_URL).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("INTAKE_TEST_BAD_URL", "not a url");
        let result = env_url("INTAKE_TEST_BAD_URL", DEFAULT_API_URL);
        std::env::remove_var("INTAKE_TEST_BAD_URL");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn env_timeout_rejects_zero_and_garbage() {
        std::env::set_var("INTAKE_TEST_TIMEOUT_ZERO", "0");
        std::env::set_var("INTAKE_TEST_TIMEOUT_TEXT", "soon");
        let zero = env_timeout("INTAKE_TEST_TIMEOUT_ZERO", 30);
        let text = env_timeout("INTAKE_TEST_TIMEOUT_TEXT", 30);
        std::env::remove_var("INTAKE_TEST_TIMEOUT_ZERO");
        std::env::remove_var("INTAKE_TEST_TIMEOUT_TEXT");
        assert!(zero.is_err());
        assert!(text.is_err());
        assert_eq!(env_timeout("INTAKE_TEST_TIMEOUT_ABSENT", 30).unwrap(), 30);
    }

    #[test]
    fn debug_redacts_token() {
        let mut cfg = IntakeApiConfig::with_base_url("http://127.0.0.1:9000").unwrap();
        cfg.api_token = Some(Zeroizing::new("super-secret".into()));
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
