//! PostgreSQL implementation of the user store.

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};
use crate::model::{LocalUser, NewLocalUser, ProfileUpdate, UserPage};
use crate::store::UserStore;

/// Column list for listings; the image blob is fetched only by single-row
/// lookups.
const LIST_COLUMNS: &str = "id, external_id, username, email, first_name, last_name, role, \
     enabled, age, NULL::bytea AS profile_image, created_at, updated_at";

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl StoreConfig {
    /// Create a config for the given URL with default pool sizing.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: default_max_connections(),
        }
    }

    /// Open a connection pool for this config.
    ///
    /// # Errors
    ///
    /// `StoreError::ConnectionFailed` when the pool cannot be established.
    pub async fn connect(&self) -> StoreResult<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await
            .map_err(StoreError::ConnectionFailed)
    }
}

/// PostgreSQL-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the database pool reference.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// `StoreError::MigrationFailed` when a migration cannot be applied.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StoreError::MigrationFailed)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewLocalUser) -> StoreResult<LocalUser> {
        tracing::debug!(username = %user.username, "inserting local user row");
        sqlx::query_as(
            r"
            INSERT INTO users
                (external_id, username, email, first_name, last_name, role,
                 enabled, age, profile_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(&user.external_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.enabled)
        .bind(user.age)
        .bind(&user.profile_image)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_query)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<LocalUser>> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_query)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<LocalUser>> {
        sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_query)
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> StoreResult<Option<LocalUser>> {
        sqlx::query_as(
            r"
            UPDATE users SET enabled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_query)
    }

    async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> StoreResult<Option<LocalUser>> {
        sqlx::query_as(
            r"
            UPDATE users
            SET first_name    = COALESCE($2, first_name),
                last_name     = COALESCE($3, last_name),
                role          = COALESCE($4, role),
                enabled       = COALESCE($5, enabled),
                age           = COALESCE($6, age),
                profile_image = COALESCE($7, profile_image),
                updated_at    = NOW()
            WHERE username = $1
            RETURNING *
            ",
        )
        .bind(username)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.role.map(|r| r.as_str().to_string()))
        .bind(update.enabled)
        .bind(update.age)
        .bind(update.profile_image)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_query)
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_query)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> StoreResult<Vec<LocalUser>> {
        sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_query)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> StoreResult<UserPage> {
        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_query)?;

        let users: Vec<LocalUser> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_query)?;

        Ok(UserPage {
            users,
            total_count,
            offset,
            limit,
        })
    }
}
