//! Session error types.
//!
//! Session operations never return these to the UI. They are logged and
//! converted into the session's `error` message with
//! [`SessionError::user_message`].

use thiserror::Error;

use crate::remote::{NormalizeError, RemoteError};
use crate::store::StoreError;

/// Shown when a failure carries no message of its own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Errors that can occur inside a session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Backend answered with an unusable login reply.
    #[error("invalid login response: {0}")]
    Normalize(#[from] NormalizeError),

    /// Credential store failed.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Message suitable for the session's `error` field.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(RemoteError::Rejected { message, .. }) => non_empty(message),
            Self::Remote(RemoteError::Timeout) => {
                "The request timed out. Check your connection and try again.".to_string()
            }
            Self::Remote(RemoteError::Network(_)) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Remote(RemoteError::InvalidResponse(_)) | Self::Normalize(_) => {
                "The server returned an unexpected response.".to_string()
            }
            Self::Store(e) => format!("Could not access the saved session: {e}"),
        }
    }
}

fn non_empty(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        message.to_string()
    }
}
