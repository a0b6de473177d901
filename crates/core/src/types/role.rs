//! Coarse authorization roles derived from backend role names.

use serde::{Deserialize, Serialize};

/// Role used to pick which parts of the app a user can reach.
///
/// The backend returns free-form role names (often Spanish, sometimes
/// capitalized). [`Role::from_backend`] folds them into these three buckets
/// using a fixed table; unknown names have no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Administrators and company accounts.
    Admin,
    /// Lenders and regular customers.
    Cliente,
    /// Advisors. Borrower ("prestatario") accounts share this role.
    Asesor,
}

impl Role {
    /// Map a single backend role name to a [`Role`].
    ///
    /// | input (case-insensitive)       | role      |
    /// |--------------------------------|-----------|
    /// | admin, administrator, empresa  | `Admin`   |
    /// | cliente                        | `Cliente` |
    /// | asesor, prestatario            | `Asesor`  |
    ///
    /// ```
    /// use prestamos_core::Role;
    ///
    /// assert_eq!(Role::from_backend("Prestatario"), Some(Role::Asesor));
    /// assert_eq!(Role::from_backend("prestamista"), None);
    /// ```
    #[must_use]
    pub fn from_backend(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "admin" | "administrator" | "empresa" => Some(Self::Admin),
            "cliente" => Some(Self::Cliente),
            "asesor" | "prestatario" => Some(Self::Asesor),
            _ => None,
        }
    }

    /// Derive the role from a backend role list.
    ///
    /// Only the first entry is consulted; order matters.
    #[must_use]
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Option<Self> {
        roles.first().and_then(|first| Self::from_backend(first.as_ref()))
    }

    /// Upper-case label, as shown in the app.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Cliente => "CLIENTE",
            Self::Asesor => "ASESOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
