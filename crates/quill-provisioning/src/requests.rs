//! Orchestrator request and response types.

use quill_core::{Result, UserRole};
use quill_db::{LocalUser, ProfileUpdate, UserPage};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_age, validate_email, validate_password, validate_username};

/// Request to provision a new user.
///
/// The role is fixed by the calling facade (self-service registration
/// provisions `USER`; the admin facade chooses), never by the end user.
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    /// Login username (unique).
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: String,
    /// Initial password credential, forwarded to the provider only.
    pub password: String,
    /// Application role to assign.
    pub role: UserRole,
    /// Age in years, 1-100.
    #[serde(default)]
    pub age: Option<i32>,
    /// Profile image payload.
    #[serde(default)]
    pub profile_image: Option<Vec<u8>>,
}

impl CreateUserRequest {
    /// Validate the request shape before any remote call.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("age", &self.age)
            .field(
                "profile_image",
                &self.profile_image.as_ref().map(|img| img.len()),
            )
            .finish()
    }
}

/// Partial update of the caller's own profile.
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    /// Given (first) name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family (last) name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Application role.
    #[serde(default)]
    pub role: Option<UserRole>,
    /// Enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Age in years, 1-100.
    #[serde(default)]
    pub age: Option<i32>,
    /// Profile image payload.
    #[serde(default)]
    pub profile_image: Option<Vec<u8>>,
}

impl UpdateProfileRequest {
    /// Validate the request shape.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when a present field is out of bounds.
    pub fn validate(&self) -> Result<()> {
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        Ok(())
    }

    /// Convert into the store's partial-update shape.
    #[must_use]
    pub fn into_profile_update(self) -> ProfileUpdate {
        ProfileUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            enabled: self.enabled,
            age: self.age,
            profile_image: self.profile_image,
        }
    }
}

/// Merged view of a provisioned user: the local id plus the
/// provider-assigned external id and profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    /// System-assigned local id.
    pub id: i64,
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
    /// Whether the account may sign in.
    pub enabled: bool,
    /// Age in years.
    pub age: Option<i32>,
}

impl From<&LocalUser> for UserView {
    fn from(user: &LocalUser) -> Self {
        Self {
            id: user.id,
            external_id: user.external_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.user_role(),
            enabled: user.enabled,
            age: user.age,
        }
    }
}

/// One page of users with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct UserPageView {
    /// The users on this page.
    pub content: Vec<UserView>,
    /// Zero-based page number.
    pub page: i64,
    /// Requested page size.
    pub size: i64,
    /// Total users across all pages.
    pub total_elements: i64,
    /// Total number of pages.
    pub total_pages: i64,
    /// Whether this page is empty.
    pub empty: bool,
}

impl UserPageView {
    /// Build the view for a store page.
    #[must_use]
    pub fn from_page(page: &UserPage, page_number: i64) -> Self {
        let content: Vec<UserView> = page.users.iter().map(UserView::from).collect();
        let total_pages = if page.limit > 0 {
            (page.total_count + page.limit - 1) / page.limit
        } else {
            0
        };
        Self {
            empty: content.is_empty(),
            page: page_number,
            size: page.limit,
            total_elements: page.total_count,
            total_pages,
            content,
        }
    }
}

/// Outcome of a startup reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Accounts imported into the local store.
    pub imported: usize,
    /// Accounts already present locally.
    pub skipped: usize,
    /// Accounts that could not be imported; logged and left for the next
    /// pass.
    pub failed: usize,
}
