//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in the migrations.

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_ADMIN: &str = "admin";

/// All valid user roles.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_STAFF, ROLE_ADMIN];

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{}'. Must be one of: {:?}",
            role, VALID_ROLES
        )))
    }
}
