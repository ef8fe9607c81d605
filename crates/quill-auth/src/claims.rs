//! Access token claim shapes.
//!
//! Projection of the identity provider's verified token: the standard
//! claims plus the nested realm-roles claim the authorization path reads.

use serde::{Deserialize, Serialize};

/// Nested realm-access claim: a map carrying the role-name list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealmAccess {
    /// Realm-level role names assigned to the subject.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims consumed from a verified access token.
///
/// Only the claims this subsystem reads are modeled; unknown claims are
/// ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject - the provider-side account identifier.
    pub sub: String,

    /// Issuer - who created the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Login username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Given (first) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    /// Family (last) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Nested realm-roles claim. Absence means no roles, not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,
}

impl TokenClaims {
    /// Realm role names, empty when the nested claim is absent.
    #[must_use]
    pub fn realm_roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|ra| ra.roles.as_slice())
            .unwrap_or_default()
    }

    /// Check whether the token carries the given realm role, verbatim.
    #[must_use]
    pub fn has_realm_role(&self, role: &str) -> bool {
        self.realm_roles().iter().any(|r| r == role)
    }
}
