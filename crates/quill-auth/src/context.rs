//! Per-request authorization context.
//!
//! [`AuthContext`] is a pure projection of one verified token: created
//! fresh per inbound call, passed explicitly into every orchestrator
//! operation, never mutated, discarded when the call completes. No
//! accessor performs I/O or caching.

use std::collections::HashSet;

use quill_core::{ProvisionError, UserRole};

use crate::claims::TokenClaims;
use crate::error::AuthError;

/// Resolved caller identity and role set for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Token subject claim (provider-side account identifier).
    pub subject: String,
    /// Login username of the caller.
    pub preferred_username: String,
    /// Email address, when the token carries one.
    pub email: Option<String>,
    /// Realm role names, verbatim from the nested claim.
    pub roles: HashSet<String>,
}

impl AuthContext {
    /// Project a verified token's claims into a request context.
    ///
    /// The roles claim may be absent (empty role set); the username claim
    /// may not, since identity-scoped operations resolve the caller's own
    /// row through it.
    ///
    /// # Errors
    ///
    /// `AuthError::MissingClaim` when `preferred_username` is absent.
    pub fn from_claims(claims: &TokenClaims) -> Result<Self, AuthError> {
        let preferred_username = claims
            .preferred_username
            .clone()
            .ok_or_else(|| AuthError::MissingClaim("preferred_username".to_string()))?;

        Ok(Self {
            subject: claims.sub.clone(),
            preferred_username,
            email: claims.email.clone(),
            roles: claims.realm_roles().iter().cloned().collect(),
        })
    }

    /// Check for a role from the closed application set.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(role.as_str())
    }

    /// Whether the caller holds an administrative role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin) || self.has_role(UserRole::Root)
    }

    /// Whether `username` is the caller's own account.
    #[must_use]
    pub fn is_self(&self, username: &str) -> bool {
        self.preferred_username == username
    }

    /// Admission check for administrative operations.
    ///
    /// # Errors
    ///
    /// `AccessDenied` when the caller holds neither ADMIN nor ROOT.
    pub fn require_admin(&self, operation: &str) -> Result<(), ProvisionError> {
        if self.is_admin() {
            return Ok(());
        }
        tracing::warn!(
            caller = %self.preferred_username,
            roles = ?self.roles,
            operation,
            "admission denied: admin role required"
        );
        Err(ProvisionError::access_denied(operation))
    }
}
