//! Handlers for the `/users` resource: registration, login, profile, and
//! admin user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lapor_core::error::CoreError;
use lapor_core::roles::{validate_role, ROLE_STUDENT};
use lapor_core::types::DbId;
use lapor_db::models::user::{CreateUser, UpdateUser, UserPublic};
use lapor_db::repositories::UserRepo;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub institutional_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users` (admin user creation).
#[derive(Debug, Deserialize)]
pub struct AdminCreateUser {
    pub institutional_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// POST /api/users/register
///
/// Self-service registration. New accounts always get the `student` role;
/// duplicates on email or institutional id are rejected with 409.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let existing = UserRepo::find_by_email_or_institutional_id(
        &state.pool,
        &input.email,
        &input.institutional_id,
    )
    .await?;
    if existing.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email or institutional id already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            institutional_id: input.institutional_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            password_hash,
            role: ROLE_STUDENT.to_string(),
        },
    )
    .await?;

    let token = generate_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/users/login
///
/// Authenticate with email + password. The 401 message is identical for
/// unknown email and wrong password so the endpoint does not reveal which
/// accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = generate_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/users/profile
///
/// The caller's own record, password hash excluded.
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserPublic>> {
    let record = UserRepo::find_public_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserPublic>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/users/{id} (admin)
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserPublic>> {
    let user = UserRepo::find_public_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user))
}

/// POST /api/users (admin)
///
/// Create a user with an explicit role.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<AdminCreateUser>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    validate_role(&input.role)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let existing = UserRepo::find_by_email_or_institutional_id(
        &state.pool,
        &input.email,
        &input.institutional_id,
    )
    .await?;
    if existing.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email or institutional id already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            institutional_id: input.institutional_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            password_hash,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User created by admin");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users/{id} (admin)
///
/// Partial update: only the fields present in the body change.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserPublic>> {
    if let Some(role) = &input.role {
        validate_role(role)?;
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(user.into()))
}

/// DELETE /api/users/{id} (admin)
///
/// Returns 200 with a message body; existing clients read it.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = UserRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(user_id = id, "User deleted by admin");

    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
