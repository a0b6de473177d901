//! User domain type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prestamos_core::{Role, UserId};

/// The signed-in user, as cached in the credential store.
///
/// Serialized with camelCase keys under `auth_user`. Only `id` and `name`
/// are required; a record without them is treated as corrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend user ID. Never zero for a valid user.
    pub id: UserId,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// URL of the profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Backend role names, in backend order.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    /// A user with just the required fields.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            last_name: None,
            username: None,
            phone_number: None,
            profile_picture: None,
            roles: Vec::new(),
        }
    }

    /// Whether this record may be surfaced as a logged-in user.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id.is_set() && !self.name.trim().is_empty()
    }

    /// Role derived from the first backend role name.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_roles(&self.roles)
    }
}

/// Outcome of reading a cached `auth_user` value.
#[derive(Debug)]
pub(crate) enum StoredUser {
    /// Parsed and valid.
    Valid(User),
    /// Not JSON, or JSON that is not an object.
    Corrupted,
    /// A JSON object that is missing `id`/`name` or does not fit [`User`].
    Incomplete,
}

impl StoredUser {
    pub(crate) fn parse(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::Corrupted;
        };
        let Value::Object(map) = &value else {
            return Self::Corrupted;
        };

        let has_id = map.get("id").is_some_and(|id| !id.is_null());
        let has_name = map
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty());
        if !has_id || !has_name {
            return Self::Incomplete;
        }

        match serde_json::from_value::<User>(value) {
            Ok(user) if user.is_valid() => Self::Valid(user),
            _ => Self::Incomplete,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            email: Some("test@example.com".to_string()),
            roles: vec!["cliente".to_string()],
            ..User::new(UserId::new(1), "Test User")
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let user = User {
            last_name: Some("Pérez".to_string()),
            phone_number: Some("5512345678".to_string()),
            ..sample()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["lastName"], "Pérez");
        assert_eq!(json["phoneNumber"], "5512345678");
        assert!(json.get("profilePicture").is_none());
    }

    #[test]
    fn test_validity() {
        assert!(sample().is_valid());
        assert!(!User::new(UserId::new(0), "Nadie").is_valid());
        assert!(!User::new(UserId::new(3), "  ").is_valid());
    }

    #[test]
    fn test_stored_user_valid() {
        let raw = serde_json::to_string(&sample()).unwrap();
        assert!(matches!(StoredUser::parse(&raw), StoredUser::Valid(u) if u == sample()));
    }

    #[test]
    fn test_stored_user_not_json() {
        assert!(matches!(StoredUser::parse("not-json"), StoredUser::Corrupted));
        assert!(matches!(StoredUser::parse("[1,2]"), StoredUser::Corrupted));
        assert!(matches!(StoredUser::parse("\"text\""), StoredUser::Corrupted));
    }

    #[test]
    fn test_stored_user_missing_fields() {
        assert!(matches!(
            StoredUser::parse(r#"{"name":"Sin Id"}"#),
            StoredUser::Incomplete
        ));
        assert!(matches!(
            StoredUser::parse(r#"{"id":4}"#),
            StoredUser::Incomplete
        ));
        assert!(matches!(
            StoredUser::parse(r#"{"id":0,"name":"Cero"}"#),
            StoredUser::Incomplete
        ));
        assert!(matches!(
            StoredUser::parse(r#"{"id":"abc","name":"Texto"}"#),
            StoredUser::Incomplete
        ));
    }

    #[test]
    fn test_role_uses_first_entry() {
        let user = User {
            roles: vec!["Prestatario".to_string(), "admin".to_string()],
            ..sample()
        };
        assert_eq!(user.role(), Some(Role::Asesor));
    }
}
