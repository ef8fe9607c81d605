//! Local user entity model.

use chrono::{DateTime, Utc};
use quill_core::{UserRole, ROOT_USERNAME};
use serde::Serialize;
use sqlx::FromRow;

/// A user account as stored locally.
///
/// A row exists if and only if a matching identity provider account exists
/// with the same `external_id`; the provisioning orchestrator is the only
/// writer of that pairing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocalUser {
    /// System-assigned identifier, immutable.
    pub id: i64,

    /// Identity provider account id, set once at creation, immutable.
    pub external_id: String,

    /// Login username (unique, immutable after creation).
    pub username: String,

    /// Email address (unique).
    pub email: String,

    /// Given (first) name.
    pub first_name: String,

    /// Family (last) name.
    pub last_name: String,

    /// Application role name; the column is CHECK-constrained to the
    /// closed set.
    pub role: String,

    /// Whether the account may sign in.
    pub enabled: bool,

    /// Age in years, 1-100 when present.
    pub age: Option<i32>,

    /// Profile image payload; list queries do not fetch it.
    #[serde(skip_serializing)]
    pub profile_image: Option<Vec<u8>>,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LocalUser {
    /// The account's role from the closed set.
    ///
    /// The column is CHECK-constrained, so anything unparseable can only
    /// come from out-of-band writes; those degrade to the lowest role.
    #[must_use]
    pub fn user_role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or(UserRole::User)
    }

    /// Whether this row is the distinguished bootstrap account.
    ///
    /// Matches on the ROOT role or the well-known bootstrap username, so a
    /// mislabeled bootstrap row still cannot be locked out or deleted.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.user_role() == UserRole::Root || self.username == ROOT_USERNAME
    }
}

/// Fields for inserting a new local row after a successful provider
/// creation.
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    /// Identity provider account id.
    pub external_id: String,
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: String,
    /// Application role.
    pub role: UserRole,
    /// Initial enabled flag.
    pub enabled: bool,
    /// Age in years.
    pub age: Option<i32>,
    /// Profile image payload.
    pub profile_image: Option<Vec<u8>>,
}

/// Partial update of a user's own profile row.
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub enabled: Option<bool>,
    pub age: Option<i32>,
    pub profile_image: Option<Vec<u8>>,
}

/// One page of users plus the total row count.
#[derive(Debug, Clone)]
pub struct UserPage {
    /// The rows of this page (profile images not loaded).
    pub users: Vec<LocalUser>,
    /// Total number of rows across all pages.
    pub total_count: i64,
    /// Offset this page started at.
    pub offset: i64,
    /// Requested page size.
    pub limit: i64,
}
