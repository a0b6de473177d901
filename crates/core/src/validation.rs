//! Client-side form validation.
//!
//! These checks run before any network call. Their errors are shown by the
//! form that produced them and never become session errors.

use thiserror::Error;

use crate::types::{Email, EmailError};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors raised by form validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Email field left blank.
    #[error("email is required")]
    MissingEmail,

    /// Password field left blank.
    #[error("password is required")]
    MissingPassword,

    /// Email present but malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Required minimum.
        min: usize,
    },

    /// New password and its confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Validate an email address from a registration or profile form.
///
/// # Errors
///
/// Returns `ValidationError::MissingEmail` for blank input and
/// `ValidationError::InvalidEmail` for a malformed address.
pub fn validate_email(email: &str) -> Result<Email, ValidationError> {
    match Email::parse(email) {
        Ok(email) => Ok(email),
        Err(EmailError::Empty) => Err(ValidationError::MissingEmail),
        Err(e) => Err(e.into()),
    }
}

/// Validate a new password.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
///
/// Returns `ValidationError::MissingPassword` or `ValidationError::PasswordTooShort`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Validate a password-change form: the new password first, then the
/// confirmation.
///
/// # Errors
///
/// Returns the length error for the new password before reporting a mismatch.
pub fn validate_password_change(
    new_password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    validate_password(new_password)?;
    if new_password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
