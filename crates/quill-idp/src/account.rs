//! Provider-side account types.

use quill_core::UserRole;
use serde::{Deserialize, Serialize};

/// The provider's view of an account.
///
/// Owned entirely by the identity provider; the orchestrator holds no copy
/// beyond a single in-flight operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdpAccount {
    /// Provider-assigned identifier, referenced by the local store.
    pub external_id: String,
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: String,
    /// Whether the account may sign in.
    pub enabled: bool,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Realm-level role names assigned to the account.
    pub realm_roles: Vec<String>,
}

impl IdpAccount {
    /// The account's application role: the first realm role inside the
    /// closed set, skipping provider-internal roles.
    #[must_use]
    pub fn primary_role(&self) -> Option<UserRole> {
        self.realm_roles
            .iter()
            .find_map(|name| UserRole::parse(name))
    }
}

/// Profile for a new provider account.
///
/// The implementation provisions the account enabled, email unverified,
/// with a single non-temporary password credential and a mandatory
/// verify-email action.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login username (unique upstream).
    pub username: String,
    /// Email address (unique upstream).
    pub email: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: String,
    /// Initial password credential.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(roles: Vec<&str>) -> IdpAccount {
        IdpAccount {
            external_id: "7c1d2a90-55e3-4b8f-a6d4-93f0c2e81b57".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Doe".to_string(),
            enabled: true,
            email_verified: false,
            realm_roles: roles.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_primary_role_skips_provider_internals() {
        let acct = account(vec!["offline_access", "uma_authorization", "ADMIN"]);
        assert_eq!(acct.primary_role(), Some(UserRole::Admin));
    }

    #[test]
    fn test_primary_role_none_outside_closed_set() {
        let acct = account(vec!["offline_access"]);
        assert_eq!(acct.primary_role(), None);
    }
}
