//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lapor_core::error::CoreError;
use lapor_core::roles::{ROLE_ADMIN, ROLE_STAFF};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `staff` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn staff_or_admin(RequireStaff(user): RequireStaff) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_STAFF {
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff or Admin role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}
