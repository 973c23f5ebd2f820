//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /register     -> register (public)
/// POST /login        -> login (public)
/// GET  /profile      -> profile (requires auth)
/// GET  /             -> list_users (admin)
/// POST /             -> create_user (admin)
/// GET  /{id}         -> get_user (admin)
/// PUT  /{id}         -> update_user (admin)
/// DELETE /{id}       -> delete_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/profile", get(users::profile))
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
