//! Route definitions for the `/files` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::attachments;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET /{id} -> download_file (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(attachments::download_file))
}
