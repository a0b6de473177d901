//! Biometric unlock.
//!
//! When the user opts in, their email and password are kept in the
//! credential store under [`keys::BIOMETRIC_CREDENTIALS`]. A later unlock
//! asks the device prompt first and, on success, replays them through the
//! ordinary [`SessionManager::login`].

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use prestamos_core::{LoginCredentials, ValidationError};

use crate::manager::SessionManager;
use crate::models::session::keys;
use crate::store::{CredentialStore, StoreError};

/// Prompt text shown by the device.
const UNLOCK_REASON: &str = "Inicia sesión con biometría";

/// Errors raised by biometric unlock.
#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("biometric authentication is not available on this device")]
    Unavailable,

    #[error("biometric authentication was cancelled")]
    Cancelled,

    #[error("no credentials are enrolled for biometric unlock")]
    NotEnrolled,

    /// The device prompt itself failed.
    #[error("biometric prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored biometric credentials are corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    #[error("stored biometric credentials are invalid: {0}")]
    InvalidCredentials(#[from] ValidationError),
}

/// Device-provided secure prompt.
#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    /// Whether the device has usable biometric hardware with an enrolment.
    async fn is_available(&self) -> bool;

    /// Show the prompt. `Ok(false)` means the user dismissed it.
    async fn authenticate(&self, reason: &str) -> Result<bool, BiometricError>;
}

/// Persisted opt-in record.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricCredentials {
    pub email: String,
    #[serde(serialize_with = "expose_password")]
    pub password: SecretString,
    pub has_stored_credentials: bool,
}

fn expose_password<S: serde::Serializer>(
    password: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret())
}

impl std::fmt::Debug for BiometricCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiometricCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("has_stored_credentials", &self.has_stored_credentials)
            .finish()
    }
}

impl From<&LoginCredentials> for BiometricCredentials {
    fn from(credentials: &LoginCredentials) -> Self {
        Self {
            email: credentials.email().to_string(),
            password: credentials.password().clone(),
            has_stored_credentials: true,
        }
    }
}

/// Biometric credentials kept in a [`CredentialStore`].
#[derive(Clone)]
pub struct BiometricVault {
    store: Arc<dyn CredentialStore>,
}

impl BiometricVault {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Store `credentials` for later biometric unlock.
    ///
    /// # Errors
    ///
    /// Returns `BiometricError::Store` if the write fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn enable(&self, credentials: &LoginCredentials) -> Result<(), BiometricError> {
        let record = BiometricCredentials::from(credentials);
        let json = serde_json::to_string(&record).map_err(StoreError::from)?;
        self.store.set(keys::BIOMETRIC_CREDENTIALS, &json).await?;
        tracing::info!("biometric unlock enabled");
        Ok(())
    }

    /// Forget the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns `BiometricError::Store` if the removal fails.
    #[instrument(skip(self))]
    pub async fn disable(&self) -> Result<(), BiometricError> {
        self.store.remove(keys::BIOMETRIC_CREDENTIALS).await?;
        tracing::info!("biometric unlock disabled");
        Ok(())
    }

    /// Read the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns `BiometricError::Corrupted` if the record is not valid JSON
    /// and `BiometricError::Store` if the read fails.
    pub async fn load(&self) -> Result<Option<BiometricCredentials>, BiometricError> {
        let Some(raw) = self.store.get(keys::BIOMETRIC_CREDENTIALS).await? else {
            return Ok(None);
        };
        let record: BiometricCredentials =
            serde_json::from_str(&raw).map_err(BiometricError::Corrupted)?;
        Ok(record.has_stored_credentials.then_some(record))
    }

    /// Whether an opt-in record is stored.
    ///
    /// # Errors
    ///
    /// See [`BiometricVault::load`].
    pub async fn has_stored_credentials(&self) -> Result<bool, BiometricError> {
        Ok(self.load().await?.is_some())
    }
}

impl std::fmt::Debug for BiometricVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiometricVault").finish_non_exhaustive()
    }
}

/// Gates stored credentials behind the device prompt.
pub struct BiometricUnlock {
    vault: BiometricVault,
    prompt: Arc<dyn BiometricPrompt>,
}

impl BiometricUnlock {
    #[must_use]
    pub fn new(vault: BiometricVault, prompt: Arc<dyn BiometricPrompt>) -> Self {
        Self { vault, prompt }
    }

    #[must_use]
    pub const fn vault(&self) -> &BiometricVault {
        &self.vault
    }

    /// Prompt the user and return the stored credentials.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the device has no biometric support
    /// - `NotEnrolled` if nothing is stored
    /// - `Cancelled` if the user dismisses the prompt
    #[instrument(skip(self))]
    pub async fn unlock(&self) -> Result<LoginCredentials, BiometricError> {
        if !self.prompt.is_available().await {
            return Err(BiometricError::Unavailable);
        }

        let record = self.vault.load().await?.ok_or(BiometricError::NotEnrolled)?;

        if !self.prompt.authenticate(UNLOCK_REASON).await? {
            tracing::info!("biometric prompt dismissed");
            return Err(BiometricError::Cancelled);
        }

        Ok(LoginCredentials::new(
            &record.email,
            record.password.expose_secret(),
        )?)
    }

    /// Unlock and log in with the stored credentials.
    ///
    /// Returns the result of [`SessionManager::login`]; a rejected login is
    /// reported through the session's `error`, not here.
    ///
    /// # Errors
    ///
    /// See [`BiometricUnlock::unlock`].
    pub async fn replay(&self, session: &SessionManager) -> Result<bool, BiometricError> {
        let credentials = self.unlock().await?;
        Ok(session.login(&credentials).await)
    }
}

impl std::fmt::Debug for BiometricUnlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiometricUnlock")
            .field("vault", &self.vault)
            .finish_non_exhaustive()
    }
}
