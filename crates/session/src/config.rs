//! Session configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRESTAMOS_API_BASE_URL` - Base URL of the backend REST API
//!
//! ## Optional
//! - `PRESTAMOS_API_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `PRESTAMOS_RESTORE_DELAY_MS` - Delay before restoring a cached session (default: 100)
//! - `PRESTAMOS_CREDENTIALS_PATH` - Credentials file (default: prestamos-credentials.json)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESTORE_DELAY_MS: u64 = 100;
const DEFAULT_CREDENTIALS_PATH: &str = "prestamos-credentials.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the backend REST API
    pub api_base_url: Url,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
    /// Delay before the start-up restore runs, so the first screen renders first
    pub restore_delay: Duration,
    /// Where the file credential store lives
    pub credentials_path: PathBuf,
}

impl SessionConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            restore_delay: Duration::from_millis(DEFAULT_RESTORE_DELAY_MS),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API URL is missing or any variable fails
    /// to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_url("PRESTAMOS_API_BASE_URL", &get_required_env("PRESTAMOS_API_BASE_URL")?)?;
        let timeout_secs = parse_u64(
            "PRESTAMOS_API_TIMEOUT_SECS",
            &get_env_or_default("PRESTAMOS_API_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string()),
        )?;
        let restore_delay_ms = parse_u64(
            "PRESTAMOS_RESTORE_DELAY_MS",
            &get_env_or_default("PRESTAMOS_RESTORE_DELAY_MS", &DEFAULT_RESTORE_DELAY_MS.to_string()),
        )?;
        let credentials_path = get_optional_env("PRESTAMOS_CREDENTIALS_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH), PathBuf::from);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            restore_delay: Duration::from_millis(restore_delay_ms),
            credentials_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = SessionConfig::new(Url::parse("https://api.example.com").unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.restore_delay, Duration::from_millis(100));
        assert_eq!(config.credentials_path, PathBuf::from("prestamos-credentials.json"));
    }

    #[test]
    fn test_parse_url_accepts_http() {
        assert!(parse_url("TEST_URL", "http://localhost:8080/api").is_ok());
        assert!(parse_url("TEST_URL", " https://cms.example.com ").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("TEST_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TEST_URL"));
        assert!(parse_url("TEST_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("TEST_NUM", " 15 ").unwrap(), 15);
        assert!(matches!(
            parse_u64("TEST_NUM", "fifteen"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
