//! Local user store contract.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{LocalUser, NewLocalUser, ProfileUpdate, UserPage};

/// CRUD over the local user record.
///
/// Each operation executes under the store's own single-statement
/// atomicity; there is no multi-row transaction spanning a provisioning
/// workflow, because the other half of every workflow targets the remote
/// identity provider.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a freshly provisioned user.
    ///
    /// # Errors
    /// `DuplicateKey` when username or email is already taken locally.
    async fn insert(&self, user: NewLocalUser) -> StoreResult<LocalUser>;

    /// Fetch a user by system id, including the profile image.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<LocalUser>>;

    /// Fetch a user by username, including the profile image.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<LocalUser>>;

    /// Set the enabled flag; returns the updated row, `None` if absent.
    async fn set_enabled(&self, id: i64, enabled: bool) -> StoreResult<Option<LocalUser>>;

    /// Apply a partial profile update to the row matching `username`;
    /// returns the updated row, `None` if absent.
    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> StoreResult<Option<LocalUser>>;

    /// Delete the row matching `username`; returns whether a row existed.
    async fn delete_by_username(&self, username: &str) -> StoreResult<bool>;

    /// All users, unpaged, profile images not loaded.
    async fn list(&self) -> StoreResult<Vec<LocalUser>>;

    /// One page of users plus the total count, profile images not loaded.
    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<UserPage>;
}
