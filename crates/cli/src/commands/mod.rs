//! Command implementations.

pub mod amortize;
pub mod biometric;
pub mod session;

use std::sync::Arc;

use thiserror::Error;

use prestamos_core::{AmortizationError, UnknownCurrency, ValidationError};
use prestamos_session::{
    BiometricError, ConfigError, CredentialStore, FileCredentialStore, HttpAuthClient, RemoteError,
    SessionConfig, SessionManager, StoreError,
};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend client error: {0}")]
    Remote(#[from] RemoteError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Biometric unlock failed: {0}")]
    Biometric(#[from] BiometricError),

    #[error("Invalid loan terms: {0}")]
    Amortization(#[from] AmortizationError),

    #[error("{0}")]
    Currency(#[from] UnknownCurrency),

    /// Login was rejected; carries the session's error message.
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

/// Session wiring shared by the session and biometric commands.
pub struct Context {
    pub store: Arc<dyn CredentialStore>,
    pub manager: SessionManager,
}

impl Context {
    /// Load configuration and build the session stack.
    ///
    /// The cached session is not restored; call
    /// [`SessionManager::restore`] when the command needs it.
    pub async fn load() -> Result<Self, CommandError> {
        let config = SessionConfig::from_env()?;
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::open(&config.credentials_path).await?);
        let remote = Arc::new(HttpAuthClient::from_config(&config)?);
        let manager = SessionManager::from_config(&config, store.clone(), remote);

        tracing::debug!(api = %config.api_base_url, "session stack ready");
        Ok(Self { store, manager })
    }
}

/// Write command output to stdout.
#[allow(clippy::print_stdout)]
pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
