//! Error-tracking configuration for the binary.
//!
//! Session settings live in [`prestamos_session::SessionConfig`]; this only
//! covers what the binary itself needs before any command runs, so that
//! `amortize` works without a backend URL.
//!
//! # Environment Variables
//!
//! - `SENTRY_DSN` - Sentry DSN (optional, disables Sentry when unset)
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (optional)

/// Sentry settings.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl TelemetryConfig {
    /// Load from environment variables, reading `.env` if present.
    #[must_use]
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self {
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
