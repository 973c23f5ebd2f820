//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lapor_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserPublic`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub institutional_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
///
/// Also used as the resolved owner/validator/handler embedded in report
/// responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPublic {
    pub id: DbId,
    pub institutional_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            institutional_id: user.institutional_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for inserting a new user. The password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub institutional_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
}

/// DTO for updating an existing user. Only non-`None` fields are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}
