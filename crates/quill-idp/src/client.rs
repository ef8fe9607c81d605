//! Identity provider client capability trait.

use async_trait::async_trait;
use quill_core::UserRole;

use crate::account::{IdpAccount, NewAccount};
use crate::error::IdpResult;

/// Remote client for the identity provider that owns credentials and
/// realm roles.
///
/// One conforming implementation exists per supported provider. Instances
/// are constructed explicitly at startup and injected into the
/// orchestrator; there is no process-global client and no lazy
/// re-initialization.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &str;

    /// Provision a new account and assign `desired_role`.
    ///
    /// The account is created enabled with a single non-temporary password
    /// credential, a mandatory verify-email action, and the role assigned
    /// by name lookup against the provider's realm role list.
    ///
    /// # Returns
    /// The provider-assigned external id of the created account.
    ///
    /// # Errors
    /// - `DuplicateAccount` - username or email already exists upstream
    /// - `AccessDenied` - the calling credential lacks provisioning rights
    /// - `Unavailable` - transport failure or provider-side 5xx
    async fn create_account(
        &self,
        profile: &NewAccount,
        desired_role: UserRole,
    ) -> IdpResult<String>;

    /// Delete the account matching `username`.
    ///
    /// Resolves the username to an external id via exact search first.
    ///
    /// # Errors
    /// - `AccountNotFound` - no account matches the username
    /// - `Unavailable` - transport failure or provider-side 5xx
    async fn delete_account(&self, username: &str) -> IdpResult<()>;

    /// Set the enabled flag on an account. Idempotent.
    ///
    /// # Errors
    /// - `AccountNotFound` / `Unavailable`
    async fn set_enabled(&self, external_id: &str, enabled: bool) -> IdpResult<()>;

    /// Assign realm roles to an account by name lookup against the
    /// provider's role list.
    ///
    /// # Errors
    /// - `RoleNotFound` - a requested role does not exist upstream
    /// - `AccountNotFound` / `Unavailable`
    async fn assign_realm_roles(&self, external_id: &str, roles: &[UserRole]) -> IdpResult<()>;

    /// List every account in the realm, with realm-level roles resolved.
    ///
    /// Used only for startup reconciliation; never on the per-request hot
    /// path.
    async fn list_accounts(&self) -> IdpResult<Vec<IdpAccount>>;

    /// Resolve a username to its external id via exact search.
    ///
    /// # Errors
    /// - `AccountNotFound` - the search returned no match; callers never
    ///   index into an empty result
    async fn resolve_id_by_username(&self, username: &str) -> IdpResult<String>;

    /// Trigger a fresh verification email for the account.
    ///
    /// # Errors
    /// - `AccountNotFound` / `Unavailable`
    async fn send_verify_email(&self, username: &str) -> IdpResult<()>;
}
