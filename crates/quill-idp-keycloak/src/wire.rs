//! Keycloak admin API wire representations.

use serde::{Deserialize, Serialize};

/// Required action attached to freshly provisioned accounts.
pub(crate) const VERIFY_EMAIL_ACTION: &str = "VERIFY_EMAIL";

/// Credential type for password credentials.
pub(crate) const PASSWORD_CREDENTIAL: &str = "password";

/// Account representation exchanged with the admin API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRepresentation {
    /// Provider-assigned id; absent on creation requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login username.
    pub username: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given (first) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family (last) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Whether the account may sign in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether the email address has been verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Credentials attached on creation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,
    /// Actions the account must complete before first use.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<String>,
}

/// Credential attached to an account on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    /// Credential type, e.g. `password`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Whether the credential must be replaced on first login.
    pub temporary: bool,
    /// The credential value.
    pub value: String,
}

impl CredentialRepresentation {
    /// A non-temporary password credential.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            credential_type: PASSWORD_CREDENTIAL.to_string(),
            temporary: false,
            value: value.into(),
        }
    }
}

/// Realm role representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRepresentation {
    /// Provider-side role id.
    pub id: String,
    /// Role name.
    pub name: String,
}
