//! Route definitions for the `/reports` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{attachments, reports};
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET   /                  -> list_reports (public)
/// POST  /                  -> create_report (requires auth, multipart)
/// GET   /my-report         -> list_my_reports (requires auth)
/// GET   /weekly-chart      -> weekly_chart (public)
/// GET   /{id}              -> get_report (public)
/// DELETE /{id}             -> delete_report (owner or staff/admin)
/// PATCH /{id}/status       -> update_report_status (requires auth)
/// PATCH /{id}/handle       -> handle_report (staff/admin)
/// POST  /{id}/reply        -> add_reply (requires auth)
/// POST  /{id}/attachments  -> upload_attachment (requires auth, multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reports::list_reports).post(reports::create_report))
        .route("/my-report", get(reports::list_my_reports))
        .route("/weekly-chart", get(reports::weekly_chart))
        .route(
            "/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        .route("/{id}/status", patch(reports::update_report_status))
        .route("/{id}/handle", patch(reports::handle_report))
        .route("/{id}/reply", post(reports::add_reply))
        .route("/{id}/attachments", post(attachments::upload_attachment))
}
