//! Application role set.
//!
//! The role set is closed: every account holds exactly one of `USER`,
//! `ADMIN`, or `ROOT`. `ROOT` marks the distinguished bootstrap account,
//! which no actor may disable or delete.

use serde::{Deserialize, Serialize};

/// Username of the distinguished bootstrap account.
pub const ROOT_USERNAME: &str = "root";

/// Application role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular self-service account.
    User,
    /// Administrative account.
    Admin,
    /// Bootstrap account; cannot be disabled or deleted by any actor.
    Root,
}

impl UserRole {
    /// Upstream role-name string for this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
            UserRole::Root => "ROOT",
        }
    }

    /// Parse an upstream role-name string.
    ///
    /// Returns `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "USER" => Some(UserRole::User),
            "ADMIN" => Some(UserRole::Admin),
            "ROOT" => Some(UserRole::Root),
            _ => None,
        }
    }

    /// Whether this role grants administrative operations.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Root)
    }

    /// All members of the closed role set.
    #[must_use]
    pub fn all() -> &'static [UserRole] {
        &[UserRole::User, UserRole::Admin, UserRole::Root]
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = crate::ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::parse(s).ok_or_else(|| {
            crate::ProvisionError::validation(format!("unknown role: '{s}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for role in UserRole::all() {
            assert_eq!(UserRole::parse(role.as_str()), Some(*role));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(UserRole::parse("SUPERUSER"), None);
        assert_eq!(UserRole::parse("user"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn test_admin_privilege() {
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::Root.is_admin());
    }

    #[test]
    fn test_serde_uses_upstream_names() {
        let json = serde_json::to_string(&UserRole::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
        let back: UserRole = serde_json::from_str("\"ROOT\"").unwrap();
        assert_eq!(back, UserRole::Root);
    }
}
