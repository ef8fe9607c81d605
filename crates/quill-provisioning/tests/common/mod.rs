//! Test doubles for orchestrator integration tests: a scriptable fake
//! identity provider and an in-memory user store.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use quill_auth::AuthContext;
use quill_core::UserRole;
use quill_db::{LocalUser, NewLocalUser, ProfileUpdate, StoreError, StoreResult, UserPage, UserStore};
use quill_idp::{IdentityProviderClient, IdpAccount, IdpError, IdpResult, NewAccount};

/// Build a request context directly, the way a facade would after token
/// verification.
pub fn ctx(username: &str, roles: &[&str]) -> AuthContext {
    AuthContext {
        subject: format!("sub-{username}"),
        preferred_username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        roles: roles.iter().map(|r| (*r).to_string()).collect(),
    }
}

/// Scriptable in-memory identity provider.
#[derive(Default)]
pub struct FakeIdp {
    accounts: Mutex<Vec<IdpAccount>>,
    next_id: AtomicU64,
    /// Number of create_account calls observed.
    pub create_calls: AtomicUsize,
    fail_create: AtomicBool,
    fail_set_enabled: AtomicBool,
    fail_delete: AtomicBool,
    verify_emails: Mutex<Vec<String>>,
}

impl FakeIdp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account as if it had been provisioned earlier.
    pub fn seed_account(&self, username: &str, role: UserRole, enabled: bool) -> String {
        let external_id = format!("idp-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.accounts.lock().unwrap().push(IdpAccount {
            external_id: external_id.clone(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Seed".to_string(),
            last_name: "User".to_string(),
            enabled,
            email_verified: true,
            realm_roles: vec![role.as_str().to_string()],
        });
        external_id
    }

    /// Make the next create_account calls fail as unavailable.
    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Make set_enabled calls fail as unavailable.
    pub fn fail_set_enabled(&self) {
        self.fail_set_enabled.store(true, Ordering::SeqCst);
    }

    /// Make delete_account calls fail as unavailable.
    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Snapshot of one account by username.
    pub fn account(&self, username: &str) -> Option<IdpAccount> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned()
    }

    /// Usernames that received a verification email.
    pub fn verify_emails(&self) -> Vec<String> {
        self.verify_emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProviderClient for FakeIdp {
    fn name(&self) -> &str {
        "fake-idp"
    }

    async fn create_account(
        &self,
        profile: &NewAccount,
        desired_role: UserRole,
    ) -> IdpResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(IdpError::unavailable("scripted create failure"));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .iter()
            .any(|a| a.username == profile.username || a.email == profile.email)
        {
            return Err(IdpError::duplicate(&profile.username));
        }

        let external_id = format!("idp-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        accounts.push(IdpAccount {
            external_id: external_id.clone(),
            username: profile.username.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            enabled: true,
            email_verified: false,
            realm_roles: vec![desired_role.as_str().to_string()],
        });
        Ok(external_id)
    }

    async fn delete_account(&self, username: &str) -> IdpResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(IdpError::unavailable("scripted delete failure"));
        }
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.username != username);
        if accounts.len() == before {
            return Err(IdpError::not_found(username));
        }
        Ok(())
    }

    async fn set_enabled(&self, external_id: &str, enabled: bool) -> IdpResult<()> {
        if self.fail_set_enabled.load(Ordering::SeqCst) {
            return Err(IdpError::unavailable("scripted set_enabled failure"));
        }
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|a| a.external_id == external_id) {
            Some(account) => {
                account.enabled = enabled;
                Ok(())
            }
            None => Err(IdpError::not_found(external_id)),
        }
    }

    async fn assign_realm_roles(&self, external_id: &str, roles: &[UserRole]) -> IdpResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|a| a.external_id == external_id) {
            Some(account) => {
                let mut names: HashSet<String> = account.realm_roles.drain(..).collect();
                names.extend(roles.iter().map(|r| r.as_str().to_string()));
                account.realm_roles = names.into_iter().collect();
                Ok(())
            }
            None => Err(IdpError::not_found(external_id)),
        }
    }

    async fn list_accounts(&self) -> IdpResult<Vec<IdpAccount>> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn resolve_id_by_username(&self, username: &str) -> IdpResult<String> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .map(|a| a.external_id.clone())
            .ok_or_else(|| IdpError::not_found(username))
    }

    async fn send_verify_email(&self, username: &str) -> IdpResult<()> {
        if self.account(username).is_none() {
            return Err(IdpError::not_found(username));
        }
        self.verify_emails.lock().unwrap().push(username.to_string());
        Ok(())
    }
}

/// In-memory user store with scriptable failures.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<LocalUser>>,
    next_id: AtomicI64,
    fail_next_insert: AtomicBool,
    /// Per-call failure script for set_enabled; `true` fails that call.
    set_enabled_script: Mutex<VecDeque<bool>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next insert fail as unavailable.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Script outcomes for upcoming set_enabled calls, in order; `true`
    /// fails that call. Unscripted calls succeed.
    pub fn script_set_enabled(&self, outcomes: &[bool]) {
        let mut script = self.set_enabled_script.lock().unwrap();
        script.extend(outcomes.iter().copied());
    }

    /// Snapshot of one row by username.
    pub fn row(&self, username: &str) -> Option<LocalUser> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.username == username)
            .cloned()
    }

    /// Number of rows whose username matches.
    pub fn count_username(&self, username: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.username == username)
            .count()
    }

    /// Seed a row as if it had been provisioned earlier.
    pub fn seed_row(&self, username: &str, role: UserRole, enabled: bool) -> LocalUser {
        let row = LocalUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            external_id: format!("seed-{username}"),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Seed".to_string(),
            last_name: "User".to_string(),
            role: role.as_str().to_string(),
            enabled,
            age: None,
            profile_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: NewLocalUser) -> StoreResult<LocalUser> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scripted insert failure".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter()
            .find(|r| r.username == user.username || r.email == user.email)
        {
            let constraint = if existing.username == user.username {
                "users_username_key"
            } else {
                "users_email_key"
            };
            return Err(StoreError::DuplicateKey {
                constraint: constraint.to_string(),
            });
        }

        let row = LocalUser {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            external_id: user.external_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.as_str().to_string(),
            enabled: user.enabled,
            age: user.age,
            profile_image: user.profile_image,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<LocalUser>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<LocalUser>> {
        Ok(self.row(username))
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> StoreResult<Option<LocalUser>> {
        let scripted_failure = self
            .set_enabled_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false);
        if scripted_failure {
            return Err(StoreError::Unavailable(
                "scripted set_enabled failure".to_string(),
            ));
        }

        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            row.enabled = enabled;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> StoreResult<Option<LocalUser>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.username == username)
            .map(|row| {
                if let Some(first_name) = update.first_name {
                    row.first_name = first_name;
                }
                if let Some(last_name) = update.last_name {
                    row.last_name = last_name;
                }
                if let Some(role) = update.role {
                    row.role = role.as_str().to_string();
                }
                if let Some(enabled) = update.enabled {
                    row.enabled = enabled;
                }
                if let Some(age) = update.age {
                    row.age = Some(age);
                }
                if let Some(image) = update.profile_image {
                    row.profile_image = Some(image);
                }
                row.updated_at = Utc::now();
                row.clone()
            }))
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.username != username);
        Ok(rows.len() != before)
    }

    async fn list(&self) -> StoreResult<Vec<LocalUser>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<UserPage> {
        let rows = self.rows.lock().unwrap();
        let users = rows
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(UserPage {
            users,
            total_count: rows.len() as i64,
            offset,
            limit,
        })
    }
}
