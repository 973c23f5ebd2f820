//! Repository for the `users` table.

use sqlx::PgPool;

use lapor_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User, UserPublic};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, institutional_id, name, email, phone, password_hash, role, \
                       created_at, updated_at";

/// Columns safe to expose in API responses (no password hash).
const PUBLIC_COLUMNS: &str =
    "id, institutional_id, name, email, phone, role, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (institutional_id, name, email, phone, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.institutional_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.password_hash)
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

    /// Find a user matching either unique key, for duplicate checks at
    /// registration and admin creation.
    pub async fn find_by_email_or_institutional_id(
        pool: &PgPool,
        email: &str,
        institutional_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 OR institutional_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(institutional_id)
            .fetch_optional(pool)
            .await
    }

    /// Safe (hash-free) view of a single user.
    pub async fn find_public_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserPublic>, sqlx::Error> {
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserPublic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Safe views of several users at once, for resolving report relations
    /// without N+1 queries.
    pub async fn find_public_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<UserPublic>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = ANY($1)");
        sqlx::query_as::<_, UserPublic>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List all users (hash-free), most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserPublic>, sqlx::Error> {
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, UserPublic>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                role = COALESCE($5, role),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.role)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
