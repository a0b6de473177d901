//! Prestamos Session - authentication lifecycle for the lending client.
//!
//! A [`SessionManager`] owns the signed-in state of the app: it logs in
//! against the backend, caches the token and user in a [`CredentialStore`],
//! resumes a cached session on launch, derives the user's [`Role`], and keeps
//! the last error for the UI to show.
//!
//! # Architecture
//!
//! ```text
//! UI ──▶ SessionManager ──▶ AuthEndpoint (HTTP backend)
//!             │
//!             └──────────▶ CredentialStore (auth_token, auth_user)
//! ```
//!
//! Collaborators are injected as trait objects so the UI layer decides where
//! credentials live and tests can run without a network.
//!
//! [`Role`]: prestamos_core::Role

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod biometric;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod remote;
pub mod store;

pub use biometric::{BiometricCredentials, BiometricError, BiometricPrompt, BiometricUnlock, BiometricVault};
pub use config::{ConfigError, SessionConfig};
pub use error::SessionError;
pub use manager::SessionManager;
pub use models::session::{AuthToken, Phase, Session};
pub use models::user::User;
pub use remote::{AuthEndpoint, AuthResponse, HttpAuthClient, LoginReply, RemoteError};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};
