//! Session state exposed to the UI.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use prestamos_core::Role;

use super::user::User;

/// Opaque bearer token issued by the backend.
///
/// `Debug` output is redacted.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for `Authorization` headers and storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created at start-up; no operation has settled yet.
    Initializing,
    /// A login, logout or restore is in flight.
    Loading,
    /// A valid user and token are held.
    Authenticated,
    /// No user is signed in.
    Unauthenticated,
}

/// Snapshot of the authentication state.
///
/// `is_logged_in` is derived from `user` and `token`, so it can only be true
/// when both are present and the user passes [`User::is_valid`].
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<User>,
    token: Option<AuthToken>,
    is_loading: bool,
    error: Option<String>,
    settled: bool,
}

impl Session {
    /// The state at process start: loading, nothing else known.
    #[must_use]
    pub const fn initializing() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            error: None,
            settled: false,
        }
    }

    pub(crate) const fn authenticated(user: User, token: AuthToken) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            is_loading: false,
            error: None,
            settled: true,
        }
    }

    pub(crate) const fn unauthenticated() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: false,
            error: None,
            settled: true,
        }
    }

    pub(crate) const fn failed(message: String) -> Self {
        Self {
            user: None,
            token: None,
            is_loading: false,
            error: Some(message),
            settled: true,
        }
    }

    pub(crate) const fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a valid user and token are held.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some() && self.user.as_ref().is_some_and(User::is_valid)
    }

    /// Message describing the last failed operation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(User::role)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.is_loading, self.settled) {
            (true, false) => Phase::Initializing,
            (true, true) => Phase::Loading,
            (false, _) if self.is_logged_in() => Phase::Authenticated,
            (false, _) => Phase::Unauthenticated,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}

/// Credential store keys.
pub mod keys {
    /// Raw bearer token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// JSON-serialized [`User`](super::User).
    pub const AUTH_USER: &str = "auth_user";

    /// JSON-serialized biometric login credentials.
    pub const BIOMETRIC_CREDENTIALS: &str = "biometric_credentials";
}

#[cfg(test)]
mod tests {
    use prestamos_core::UserId;

    use super::*;

    fn user() -> User {
        User {
            roles: vec!["admin".to_string(), "cliente".to_string()],
            ..User::new(UserId::new(1), "Test User")
        }
    }

    #[test]
    fn test_initial_state() {
        let session = Session::initializing();
        assert!(session.is_loading());
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.phase(), Phase::Initializing);
    }

    #[test]
    fn test_authenticated_state() {
        let session = Session::authenticated(user(), AuthToken::new("mock-token-123"));
        assert!(session.is_logged_in());
        assert_eq!(session.token().map(AuthToken::expose), Some("mock-token-123"));
        assert_eq!(session.role(), Some(Role::Admin));
        assert_eq!(session.phase(), Phase::Authenticated);
    }

    #[test]
    fn test_invalid_user_is_never_logged_in() {
        let session = Session::authenticated(
            User::new(UserId::new(0), "Test User"),
            AuthToken::new("t"),
        );
        assert!(!session.is_logged_in());
        assert_eq!(session.phase(), Phase::Unauthenticated);
    }

    #[test]
    fn test_loading_after_settle() {
        let mut session = Session::unauthenticated();
        session.set_loading(true);
        assert_eq!(session.phase(), Phase::Loading);
    }

    #[test]
    fn test_failed_carries_message() {
        let mut session = Session::failed("Invalid credentials".to_string());
        assert_eq!(session.error(), Some("Invalid credentials"));
        session.clear_error();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_token_debug_redacted() {
        let debug = format!("{:?}", AuthToken::new("mock-token-123"));
        assert!(!debug.contains("mock-token-123"));
    }
}
