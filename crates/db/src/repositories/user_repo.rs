//! Repository for the `users` table.

use healthvitals_core::roles::ROLE_DEVICE;
use healthvitals_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, name, role, is_active, api_token_hash, \
                        device_id, last_login_at, created_at, updated_at";

/// Shared account that anonymous device submissions are filed under.
pub const PUBLIC_DEVICE_EMAIL: &str = "public@device.local";

/// Placeholder stored as the public account's password hash. It is not a
/// PHC string, so password verification always fails for it.
const PUBLIC_DEVICE_PASSWORD_HASH: &str = "not-used";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the active user holding the API token with the given hash.
    pub async fn find_by_api_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE api_token_hash = $1 AND is_active = true"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Replace the user's API token hash and optionally pair a device.
    ///
    /// Also stamps `last_login_at`, since tokens are only issued at login.
    /// A `None` device id keeps the currently paired device.
    pub async fn set_api_token(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
        device_id: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                api_token_hash = $2,
                device_id = COALESCE($3, device_id),
                last_login_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(token_hash)
            .bind(device_id)
            .fetch_one(pool)
            .await
    }

    /// Set `last_login_at` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Fetch the shared public device account, creating it on first use.
    ///
    /// `None` when the reserved email is held by an account that is not a
    /// device account; such a row is never adopted.
    pub async fn find_or_create_public_device_user(
        pool: &PgPool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, name, role)
             VALUES ($1, $2, 'Public Device User', $3)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
                WHERE users.role = EXCLUDED.role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(PUBLIC_DEVICE_EMAIL)
            .bind(PUBLIC_DEVICE_PASSWORD_HASH)
            .bind(ROLE_DEVICE)
            .fetch_optional(pool)
            .await
    }

    /// Replace the display name. `None` when the user does not exist.
    pub async fn update_name(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Total number of users.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Number of users holding `role`.
    pub async fn count_by_role(pool: &PgPool, role: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(pool)
            .await
    }
}
