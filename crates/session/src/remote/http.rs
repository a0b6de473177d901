//! HTTP implementation of [`AuthEndpoint`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use super::{AuthEndpoint, LoginReply, RemoteError};
use crate::config::SessionConfig;
use crate::models::session::AuthToken;

/// Login path, relative to the API base URL.
const LOGIN_PATH: &str = "auth/login";

/// Logout path, relative to the API base URL.
const LOGOUT_PATH: &str = "auth/logout";

/// Request body for the login endpoint.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Auth client for the lending backend's REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: reqwest::Client,
    login_url: Url,
    logout_url: Url,
}

impl HttpAuthClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Network` if the HTTP client cannot be built and
    /// `RemoteError::InvalidResponse` if the endpoint URLs cannot be joined
    /// onto `base_url`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Network)?;

        // A base without a trailing slash would drop its last path segment on join.
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| RemoteError::InvalidResponse(format!("invalid endpoint URL: {e}")))
        };

        Ok(Self {
            login_url: join(LOGIN_PATH)?,
            logout_url: join(LOGOUT_PATH)?,
            client,
        })
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpAuthClient::new`].
    pub fn from_config(config: &SessionConfig) -> Result<Self, RemoteError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    /// Full login URL.
    #[must_use]
    pub const fn login_url(&self) -> &Url {
        &self.login_url
    }
}

#[async_trait]
impl AuthEndpoint for HttpAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginReply, RemoteError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest {
                username: email,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response).await);
        }

        let body: serde_json::Value = response.json().await?;
        LoginReply::from_value(body)
    }

    #[instrument(skip(self, token))]
    async fn logout(&self, token: &AuthToken) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.logout_url.clone())
            .bearer_auth(token.expose())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }
}

/// Build a `Rejected` error from a non-success response.
///
/// The message is the first non-blank string among the body's `message` and
/// `error` fields, falling back to the status line.
async fn rejection(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response.json::<serde_json::Value>().await.ok();

    RemoteError::Rejected {
        status: status.as_u16(),
        message: body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("HTTP {status}")),
    }
}

fn error_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .into_iter()
        .filter_map(|key| body.get(key)?.as_str())
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_endpoint_urls_keep_base_path() {
        let base = Url::parse("https://cms.example.com/wp-json/prestamos/v1").unwrap();
        let client = HttpAuthClient::new(&base, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.login_url().as_str(),
            "https://cms.example.com/wp-json/prestamos/v1/auth/login"
        );
        assert_eq!(
            client.logout_url.as_str(),
            "https://cms.example.com/wp-json/prestamos/v1/auth/logout"
        );
    }

    #[test]
    fn test_error_message_precedence() {
        assert_eq!(
            error_message(&json!({"message": "Invalid credentials", "error": "x"})).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(&json!({"message": "  ", "error": "Account locked"})).as_deref(),
            Some("Account locked")
        );
    }

    #[test]
    fn test_error_message_ignores_non_string_fields() {
        assert_eq!(
            error_message(&json!({"error": {"code": "rest_forbidden"}, "message": "Sorry, you are not allowed"}))
                .as_deref(),
            Some("Sorry, you are not allowed")
        );
        assert_eq!(
            error_message(&json!({"code": 401, "error": 401, "message": null})),
            None
        );
        assert_eq!(error_message(&json!("plain string")), None);
    }

    #[test]
    fn test_endpoint_urls_with_trailing_slash() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let client = HttpAuthClient::new(&base, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.login_url().as_str(),
            "http://localhost:8080/api/auth/login"
        );
    }
}
