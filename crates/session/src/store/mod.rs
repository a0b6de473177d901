//! Credential storage.
//!
//! The session caches its token and user across restarts through a small
//! async key-value interface. Implementations decide where values live: in
//! memory for tests and ephemeral sessions, or in a JSON file on disk.
//!
//! # Security Note
//!
//! Values include bearer tokens and, when biometric unlock is enabled, a
//! password. Implementations must never log values and should restrict
//! access to their backing storage.

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`CredentialStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("credentials file {} is corrupted: {source}", path.display())]
    Corrupted {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store cannot be used right now.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Async key-value persistence for session credentials.
///
/// Last write wins; there are no transactions.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value. Returns `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Succeeds when the key is already absent.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
