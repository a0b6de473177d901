//! Backend response normalization.
//!
//! Deployments of the backend disagree on field names (`id` vs `ID`, `role`
//! vs `roles`, camelCase vs snake_case). Each field below is resolved by
//! trying its keys in order and taking the first one that is present and
//! not `null`:
//!
//! | field            | keys, in precedence order                              | when absent          |
//! |------------------|--------------------------------------------------------|----------------------|
//! | user record      | `user`, `data`                                         | error                |
//! | `id`             | `id`, `ID` (number or numeric string, non-zero)        | error                |
//! | `roles`          | `roles`, `role` (array of strings or a single string)  | `["cliente"]`        |
//! | `name`           | `name`, `displayName`, `display_name` (non-blank)      | `"Usuario"`          |
//! | `email`          | `email`, `user_email`                                  | the login email      |
//! | `lastName`       | `lastName`, `last_name`                                | none                 |
//! | `username`       | `username`, `user_login`                               | none                 |
//! | `phoneNumber`    | `phoneNumber`, `phone_number`, `phone`                 | none                 |
//! | `profilePicture` | `profilePicture`, `profile_picture`, `avatar`          | none                 |
//! | token            | `token`, `accessToken`, `access_token`                 | error                |
//! | refresh token    | `refreshToken`, `refresh_token`                        | none                 |
//! | expires in       | `expiresIn`, `expires_in` (seconds)                    | none                 |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use prestamos_core::UserId;

use crate::models::session::AuthToken;
use crate::models::user::User;

use super::RemoteError;

/// Role assigned when the backend sends none.
pub const DEFAULT_ROLE: &str = "cliente";

/// Name shown when the backend sends none.
pub const DEFAULT_NAME: &str = "Usuario";

/// Ways a login reply can fail to describe a usable session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No user object in the reply.
    #[error("response has no user record")]
    MissingUser,

    /// The user object has no usable ID.
    #[error("user record has no valid id")]
    MissingId,

    /// No token in the reply.
    #[error("response has no token")]
    MissingToken,
}

/// Raw login reply, as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginReply(Map<String, Value>);

impl LoginReply {
    /// Wrap a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::InvalidResponse` if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, RemoteError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RemoteError::InvalidResponse(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// The underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A login reply after normalization.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// The signed-in user.
    pub user: User,
    /// Bearer token for later requests.
    pub token: AuthToken,
    /// Refresh token, when the backend issues one.
    pub refresh_token: Option<AuthToken>,
    /// Token lifetime in seconds, when sent.
    pub expires_in: Option<u64>,
}

/// Normalize a login reply.
///
/// `login_email` fills in the user's email when the backend omits it.
///
/// # Errors
///
/// Returns a [`NormalizeError`] when the user record, its ID, or the token
/// is missing.
pub fn normalize_login(reply: &LoginReply, login_email: &str) -> Result<AuthResponse, NormalizeError> {
    let root = reply.as_map();

    let record = pick(root, &["user", "data"])
        .and_then(Value::as_object)
        .ok_or(NormalizeError::MissingUser)?;
    let mut user = normalize_user(record)?;
    if user.email.is_none() && !login_email.is_empty() {
        user.email = Some(login_email.to_owned());
    }

    let token = pick_string(root, &["token", "accessToken", "access_token"])
        .ok_or(NormalizeError::MissingToken)?;

    Ok(AuthResponse {
        user,
        token: AuthToken::new(token),
        refresh_token: pick_string(root, &["refreshToken", "refresh_token"]).map(AuthToken::new),
        expires_in: pick(root, &["expiresIn", "expires_in"]).and_then(parse_u64),
    })
}

/// Normalize a backend user record into a [`User`].
///
/// # Errors
///
/// Returns `NormalizeError::MissingId` when neither `id` nor `ID` holds a
/// non-zero integer.
pub fn normalize_user(record: &Map<String, Value>) -> Result<User, NormalizeError> {
    let id = pick(record, &["id", "ID"])
        .and_then(parse_i64)
        .map(UserId::new)
        .filter(UserId::is_set)
        .ok_or(NormalizeError::MissingId)?;

    let roles = pick(record, &["roles", "role"])
        .map_or_else(|| vec![DEFAULT_ROLE.to_owned()], parse_roles);

    let name = pick_string(record, &["name", "displayName", "display_name"])
        .unwrap_or_else(|| DEFAULT_NAME.to_owned());

    Ok(User {
        id,
        name,
        email: pick_string(record, &["email", "user_email"]),
        last_name: pick_string(record, &["lastName", "last_name"]),
        username: pick_string(record, &["username", "user_login"]),
        phone_number: pick_string(record, &["phoneNumber", "phone_number", "phone"]),
        profile_picture: pick_string(record, &["profilePicture", "profile_picture", "avatar"]),
        roles,
    })
}

/// First present, non-null value among `keys`.
fn pick<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// First non-blank string (numbers are rendered) among `keys`.
fn pick_string(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_roles(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_owned()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}
