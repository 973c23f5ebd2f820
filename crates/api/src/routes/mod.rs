pub mod files;
pub mod health;
pub mod reports;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/register               register (public)
/// /users/login                  login (public)
/// /users/profile                own profile (requires auth)
/// /users                        list, create (admin only)
/// /users/{id}                   update, delete (admin only)
///
/// /reports                      list (public), create (requires auth, multipart)
/// /reports/my-report            caller's reports (requires auth)
/// /reports/weekly-chart         reports per day, trailing week (public)
/// /reports/{id}                 get (public), delete (owner or staff/admin)
/// /reports/{id}/status          update status (requires auth, PATCH)
/// /reports/{id}/handle          officer triage (staff/admin, PATCH)
/// /reports/{id}/reply           append reply (requires auth, POST)
/// /reports/{id}/attachments     upload attachment (requires auth, multipart)
///
/// /files/{id}                   download stored attachment (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // User accounts: registration, login, profile, admin management.
        .nest("/users", users::router())
        // Complaint reports and their replies / history / attachments.
        .nest("/reports", reports::router())
        // Database-stored attachment downloads.
        .nest("/files", files::router())
}
