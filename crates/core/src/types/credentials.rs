//! Login credentials.

use secrecy::{ExposeSecret, SecretString};

use crate::validation::ValidationError;

/// Email/password pair submitted by the login form or replayed by the
/// biometric unlock.
///
/// Construction only checks presence; format rules belong to registration
/// and password-change forms (see [`crate::validation`]). The password is a
/// [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: String,
    password: SecretString,
}

impl LoginCredentials {
    /// Build credentials from raw form input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingEmail` or `ValidationError::MissingPassword`
    /// when the respective field is blank.
    pub fn new(email: &str, password: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }

        let password: String = password.into();
        if password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }

        Ok(Self {
            email: email.to_owned(),
            password: SecretString::from(password),
        })
    }

    /// The email, sent to the backend as `username`.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The password, wrapped.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    /// Borrow the plain password for serialization into a request body.
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}
