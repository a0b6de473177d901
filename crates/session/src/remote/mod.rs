//! Remote authentication endpoint.
//!
//! The backend is a content-management REST API. Its login reply is loosely
//! shaped (field names differ between deployments), so endpoints hand back
//! the raw [`LoginReply`] and [`normalize`] turns it into an [`AuthResponse`]
//! with a documented precedence order.

mod http;
pub mod normalize;

pub use http::HttpAuthClient;
pub use normalize::{AuthResponse, LoginReply, NormalizeError};

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::models::session::AuthToken;

/// Errors talking to the backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The backend answered 2xx with a body that could not be read.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

/// The backend's authentication API.
#[async_trait]
pub trait AuthEndpoint: Send + Sync {
    /// Exchange credentials for a user record and token.
    ///
    /// The email is sent as `username`.
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginReply, RemoteError>;

    /// Tell the backend the token is no longer in use.
    ///
    /// Callers treat this as best-effort; no response contract is relied upon.
    async fn logout(&self, token: &AuthToken) -> Result<(), RemoteError>;
}
