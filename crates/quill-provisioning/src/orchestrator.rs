//! Provisioning orchestrator.
//!
//! Owns the create/delete/enable/disable/update workflows, driving the
//! identity provider client and the local user store and issuing
//! compensating actions on partial failure. Collaborators are injected at
//! construction; the resolved [`AuthContext`] is an explicit parameter on
//! every operation that needs caller identity.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use quill_auth::AuthContext;
use quill_core::{ProvisionError, Result, UserRole};
use quill_db::{LocalUser, NewLocalUser, UserStore};
use quill_idp::{IdentityProviderClient, IdpError, NewAccount};

use crate::requests::{
    CreateUserRequest, ReconcileReport, UpdateProfileRequest, UserPageView, UserView,
};
use crate::saga::with_compensation;

/// Largest accepted page size for listings.
const MAX_PAGE_SIZE: i64 = 100;

/// Saga coordinator for user identity provisioning.
///
/// Each operation executes synchronously on the caller's task: steps are
/// strictly sequential because each outcome decides whether the next step
/// or a compensation runs, and once the provider confirms a creation the
/// workflow always proceeds to the local write or its compensation.
pub struct ProvisioningOrchestrator {
    idp: Arc<dyn IdentityProviderClient>,
    store: Arc<dyn UserStore>,
}

impl ProvisioningOrchestrator {
    /// Create an orchestrator over injected collaborators.
    #[must_use]
    pub fn new(idp: Arc<dyn IdentityProviderClient>, store: Arc<dyn UserStore>) -> Self {
        Self { idp, store }
    }

    /// Provision a new user: provider account first, then the local row.
    ///
    /// A local failure after provider success triggers a compensating
    /// account deletion so no enabled provider account is left without a
    /// local counterpart.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` - malformed request, nothing was called
    /// - `DuplicateAccount` - username/email taken upstream or locally
    /// - `ProviderUnavailable` - remote or store failure
    /// - `PartialProvisioningFailure` - the compensation itself failed
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<UserView> {
        request.validate()?;
        info!(role = %request.role, "creating user");

        let profile = NewAccount {
            username: request.username.clone(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            password: request.password.clone(),
        };
        let compensation_username = request.username.clone();

        let outcome = with_compensation(
            // Primary: provision the provider account.
            async {
                self.idp
                    .create_account(&profile, request.role)
                    .await
                    .map_err(ProvisionError::from)
            },
            // Secondary: insert the local row with the pairing reference.
            |external_id: &String| {
                let new_user = NewLocalUser {
                    external_id: external_id.clone(),
                    username: request.username.clone(),
                    email: request.email.clone(),
                    first_name: request.first_name.clone(),
                    last_name: request.last_name.clone(),
                    role: request.role,
                    enabled: true,
                    age: request.age,
                    profile_image: request.profile_image.clone(),
                };
                async move { self.store.insert(new_user).await.map_err(ProvisionError::from) }
            },
            // Compensation: delete-if-exists upstream; an account already
            // gone counts as compensated.
            |_external_id: &String| {
                let username = compensation_username.clone();
                async move {
                    match self.idp.delete_account(&username).await {
                        Ok(()) | Err(IdpError::AccountNotFound { .. }) => Ok(()),
                        Err(err) => Err(ProvisionError::from(err)),
                    }
                }
            },
        )
        .await;

        match outcome {
            Ok((external_id, row)) => {
                info!(user_id = row.id, %external_id, "user created");
                Ok(UserView::from(&row))
            }
            Err(failure) => {
                if failure.was_compensated() {
                    warn!(
                        username = %request.username,
                        "local insert failed; provider account rolled back"
                    );
                }
                let err = failure.into_provision_error();
                error!(username = %request.username, error = %err, "user creation failed");
                Err(err)
            }
        }
    }

    /// Delete a user, provider first, then the local row.
    ///
    /// The ordering guarantees a crash between the steps never creates a
    /// local row without a provider counterpart; the transient
    /// provider-gone/local-present window is closed by the next
    /// reconciliation pass. A provider account already absent falls
    /// through as deleted.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` - caller is not an admin
    /// - `UserNotFound` - no local row for the username
    /// - `OperationNotPermitted` - target is the root account
    /// - `ProviderUnavailable` - remote failure, nothing changed locally
    #[instrument(skip(self, ctx), fields(caller = %ctx.preferred_username))]
    pub async fn delete_user(&self, ctx: &AuthContext, username: &str) -> Result<()> {
        ctx.require_admin("delete a user")?;

        let row = self
            .store
            .find_by_username(username)
            .await
            .map_err(ProvisionError::from)?
            .ok_or_else(|| ProvisionError::user_not_found(username))?;

        if row.is_root() {
            return Err(ProvisionError::not_permitted(
                "the root account cannot be deleted",
            ));
        }

        match self.idp.delete_account(username).await {
            Ok(()) => {}
            Err(IdpError::AccountNotFound { .. }) => {
                // Already gone upstream; deletion is idempotent.
                info!(username, "provider account already absent, continuing");
            }
            Err(err) => return Err(ProvisionError::from(err)),
        }

        self.store
            .delete_by_username(username)
            .await
            .map_err(ProvisionError::from)?;

        info!(username, "user deleted");
        Ok(())
    }

    /// Enable a user account.
    ///
    /// # Errors
    ///
    /// See [`ProvisioningOrchestrator::set_user_enabled`].
    pub async fn enable_user(&self, ctx: &AuthContext, id: i64) -> Result<UserView> {
        self.set_user_enabled(ctx, id, true).await
    }

    /// Disable a user account.
    ///
    /// # Errors
    ///
    /// See [`ProvisioningOrchestrator::set_user_enabled`].
    pub async fn disable_user(&self, ctx: &AuthContext, id: i64) -> Result<UserView> {
        self.set_user_enabled(ctx, id, false).await
    }

    /// Flip a user's enabled flag locally, mirrored to the provider.
    ///
    /// The local flag is written optimistically; if the provider call
    /// fails the flag is reverted to its recorded pre-call value. A failed
    /// revert leaves the row inconsistent and escalates as
    /// `PartialProvisioningFailure` for out-of-band reconciliation.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` - caller is not an admin
    /// - `UserNotFound` - no local row for the id
    /// - `OperationNotPermitted` - target is the caller itself or the
    ///   root account, regardless of caller role
    /// - `ProviderUnavailable` - remote failure, local flag reverted
    /// - `PartialProvisioningFailure` - the revert itself failed
    #[instrument(skip(self, ctx), fields(caller = %ctx.preferred_username))]
    pub async fn set_user_enabled(
        &self,
        ctx: &AuthContext,
        id: i64,
        enabled: bool,
    ) -> Result<UserView> {
        ctx.require_admin("enable or disable a user")?;

        let row = self
            .store
            .find_by_id(id)
            .await
            .map_err(ProvisionError::from)?
            .ok_or_else(|| ProvisionError::user_not_found(id.to_string()))?;

        if ctx.is_self(&row.username) || row.is_root() {
            return Err(ProvisionError::not_permitted(
                "neither the caller's own account nor the root account may be \
                 enabled or disabled",
            ));
        }

        let prior_enabled = row.enabled;
        let external_id = row.external_id.clone();

        let outcome = with_compensation(
            // Primary: optimistic local flip.
            async {
                self.store
                    .set_enabled(id, enabled)
                    .await
                    .map_err(ProvisionError::from)?
                    .ok_or_else(|| ProvisionError::user_not_found(id.to_string()))
            },
            // Secondary: mirror the flag to the provider.
            |_updated: &LocalUser| {
                let external_id = external_id.clone();
                async move {
                    self.idp
                        .set_enabled(&external_id, enabled)
                        .await
                        .map_err(ProvisionError::from)
                }
            },
            // Compensation: revert to the recorded pre-call value.
            |_updated: &LocalUser| async move {
                self.store
                    .set_enabled(id, prior_enabled)
                    .await
                    .map_err(ProvisionError::from)
                    .map(|_| ())
            },
        )
        .await;

        match outcome {
            Ok((updated, ())) => {
                info!(user_id = id, enabled, "enabled flag updated");
                Ok(UserView::from(&updated))
            }
            Err(failure) => {
                if failure.was_compensated() {
                    warn!(
                        user_id = id,
                        enabled = prior_enabled,
                        "provider rejected the flag change; local flag reverted"
                    );
                }
                let err = failure.into_provision_error();
                error!(user_id = id, error = %err, "enable/disable failed");
                Err(err)
            }
        }
    }

    /// Update the caller's own profile row, resolved from the context.
    ///
    /// The target row comes from the authenticated username, never from a
    /// caller-supplied id, so one account cannot update another by
    /// spoofing an id parameter. Local-only; nothing is mirrored upstream.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` - a present field is out of bounds
    /// - `UserNotFound` - the caller has no local row
    #[instrument(skip(self, ctx, request), fields(caller = %ctx.preferred_username))]
    pub async fn update_own_profile(
        &self,
        ctx: &AuthContext,
        request: UpdateProfileRequest,
    ) -> Result<UserView> {
        request.validate()?;

        let updated = self
            .store
            .update_profile(&ctx.preferred_username, request.into_profile_update())
            .await
            .map_err(ProvisionError::from)?
            .ok_or_else(|| ProvisionError::user_not_found(ctx.preferred_username.clone()))?;

        debug!(user_id = updated.id, "profile updated");
        Ok(UserView::from(&updated))
    }

    /// Fetch a user by local id.
    ///
    /// # Errors
    ///
    /// `UserNotFound` on a miss.
    pub async fn get_user_by_id(&self, id: i64) -> Result<UserView> {
        let row = self
            .store
            .find_by_id(id)
            .await
            .map_err(ProvisionError::from)?
            .ok_or_else(|| ProvisionError::user_not_found(id.to_string()))?;
        Ok(UserView::from(&row))
    }

    /// Fetch a user by username.
    ///
    /// # Errors
    ///
    /// `UserNotFound` on a miss.
    pub async fn get_user_by_username(&self, username: &str) -> Result<UserView> {
        let row = self
            .store
            .find_by_username(username)
            .await
            .map_err(ProvisionError::from)?
            .ok_or_else(|| ProvisionError::user_not_found(username))?;
        Ok(UserView::from(&row))
    }

    /// List all users, unpaged.
    ///
    /// # Errors
    ///
    /// `AccessDenied` when the caller is not an admin.
    pub async fn list_users(&self, ctx: &AuthContext) -> Result<Vec<UserView>> {
        ctx.require_admin("list users")?;
        let rows = self.store.list().await.map_err(ProvisionError::from)?;
        Ok(rows.iter().map(UserView::from).collect())
    }

    /// List one page of users.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` - caller is not an admin
    /// - `ValidationFailed` - page negative or size outside 1-100
    pub async fn list_users_page(
        &self,
        ctx: &AuthContext,
        page: i64,
        size: i64,
    ) -> Result<UserPageView> {
        ctx.require_admin("list users")?;
        if page < 0 {
            return Err(ProvisionError::validation("page must not be negative"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ProvisionError::validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let store_page = self
            .store
            .list_page(page * size, size)
            .await
            .map_err(ProvisionError::from)?;
        Ok(UserPageView::from_page(&store_page, page))
    }

    /// Trigger a fresh verification email for a user.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` - caller is not an admin
    /// - `AccountNotFound` - no provider account for the username
    #[instrument(skip(self, ctx), fields(caller = %ctx.preferred_username))]
    pub async fn resend_verify_email(&self, ctx: &AuthContext, username: &str) -> Result<()> {
        ctx.require_admin("resend a verification email")?;
        self.idp
            .send_verify_email(username)
            .await
            .map_err(ProvisionError::from)?;
        info!(username, "verification email resent");
        Ok(())
    }

    /// Startup reconciliation: import provider accounts missing locally.
    ///
    /// Non-destructive by design: existing rows are skipped untouched,
    /// individual failures are logged and counted but never compensated,
    /// and the provider is never written to.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` when the account listing itself fails.
    #[instrument(skip(self))]
    pub async fn reconcile_from_idp(&self) -> Result<ReconcileReport> {
        let accounts = self
            .idp
            .list_accounts()
            .await
            .map_err(ProvisionError::from)?;
        info!(count = accounts.len(), "reconciling provider accounts");

        let mut report = ReconcileReport::default();
        for account in accounts {
            match self.store.find_by_username(&account.username).await {
                Ok(Some(_)) => report.skipped += 1,
                Ok(None) => {
                    let role = account.primary_role().unwrap_or(UserRole::User);
                    let new_user = NewLocalUser {
                        external_id: account.external_id.clone(),
                        username: account.username.clone(),
                        email: account.email.clone(),
                        first_name: account.first_name.clone(),
                        last_name: account.last_name.clone(),
                        role,
                        enabled: account.enabled,
                        age: None,
                        profile_image: None,
                    };
                    match self.store.insert(new_user).await {
                        Ok(row) => {
                            debug!(username = %account.username, user_id = row.id, "imported");
                            report.imported += 1;
                        }
                        Err(err) => {
                            warn!(
                                username = %account.username,
                                error = %err,
                                "import failed, leaving for the next pass"
                            );
                            report.failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(username = %account.username, error = %err, "lookup failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed,
            "reconciliation finished"
        );
        Ok(report)
    }
}
