//! Handlers for the `/reports` resource: listing, creation, status changes,
//! replies, and deletion.

use std::collections::HashMap;
use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use lapor_core::error::CoreError;
use lapor_core::pagination::{clamp_limit, clamp_page, total_pages};
use lapor_core::report::{
    day_label, plan_status_change, validate_category, validate_status, weekly_window,
    StatusSummary,
};
use lapor_core::roles::{ROLE_ADMIN, ROLE_STAFF};
use lapor_core::types::DbId;
use lapor_db::models::report::{
    AddReply, CreateReport, HandleReport, MyReportParams, Report, ReportDetail, ReportListParams,
    ReportView, ReplyView, UpdateReportStatus,
};
use lapor_db::models::user::UserPublic;
use lapor_db::repositories::{ReportRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// Default page size for the public list endpoint.
const LIST_DEFAULT_LIMIT: i64 = 100;

/// Default page size for the caller-scoped list endpoint.
const MY_REPORTS_DEFAULT_LIMIT: i64 = 10;

/// Hard ceiling on page size for both list endpoints.
const MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Paginated list envelope.
///
/// `total_items` is the unfiltered report count even when a `status` filter
/// is applied; clients have always relied on it as a global counter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub data: Vec<ReportView>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub summary: StatusSummary,
}

/// One entry of the weekly chart: a day label and its report count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub name: String,
    pub total_reports: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the owner / validator / handler users for a batch of reports in
/// one query instead of three per row.
async fn resolve_views(
    state: &AppState,
    reports: Vec<Report>,
) -> Result<Vec<ReportView>, sqlx::Error> {
    let mut ids: Vec<DbId> = Vec::new();
    for report in &reports {
        ids.push(report.user_id);
        ids.extend(report.validated_by);
        ids.extend(report.handled_by);
    }
    ids.sort_unstable();
    ids.dedup();

    let users = user_map(state, &ids).await?;

    Ok(reports
        .into_iter()
        .map(|report| {
            let user = users.get(&report.user_id).cloned();
            let validator = report.validated_by.and_then(|id| users.get(&id).cloned());
            let handler = report.handled_by.and_then(|id| users.get(&id).cloned());
            ReportView {
                report,
                user,
                validator,
                handler,
            }
        })
        .collect())
}

/// Fetch the given users as an id-keyed map.
async fn user_map(
    state: &AppState,
    ids: &[DbId],
) -> Result<HashMap<DbId, UserPublic>, sqlx::Error> {
    let users = UserRepo::find_public_by_ids(&state.pool, ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

// ---------------------------------------------------------------------------
// List handlers
// ---------------------------------------------------------------------------

/// GET /api/reports
///
/// Public paginated list, newest first, with an optional status filter and
/// a global status summary.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> AppResult<Json<ReportPage>> {
    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit, LIST_DEFAULT_LIMIT, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let reports =
        ReportRepo::list_page(&state.pool, params.status.as_deref(), limit, offset).await?;
    let total_items = ReportRepo::count_all(&state.pool).await?;
    let counts = ReportRepo::status_counts(&state.pool, None).await?;

    let data = resolve_views(&state, reports).await?;
    let summary =
        StatusSummary::from_counts(counts.iter().map(|c| (c.status.as_str(), c.count)));

    Ok(Json(ReportPage {
        data,
        total_items,
        total_pages: total_pages(total_items, limit),
        current_page: page,
        summary,
    }))
}

/// GET /api/reports/my-report
///
/// The caller's own reports, same envelope as the public list but with
/// both the counts and the summary scoped to the caller.
pub async fn list_my_reports(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<MyReportParams>,
) -> AppResult<Json<ReportPage>> {
    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit, MY_REPORTS_DEFAULT_LIMIT, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let reports =
        ReportRepo::list_page_for_user(&state.pool, user.user_id, limit, offset).await?;
    let total_items = ReportRepo::count_for_user(&state.pool, user.user_id).await?;
    let counts = ReportRepo::status_counts(&state.pool, Some(user.user_id)).await?;

    let data = resolve_views(&state, reports).await?;
    let summary =
        StatusSummary::from_counts(counts.iter().map(|c| (c.status.as_str(), c.count)));

    Ok(Json(ReportPage {
        data,
        total_items,
        total_pages: total_pages(total_items, limit),
        current_page: page,
        summary,
    }))
}

/// GET /api/reports/weekly-chart
///
/// Reports per calendar day over the trailing week. Days without reports
/// produce no entry.
pub async fn weekly_chart(State(state): State<AppState>) -> AppResult<Json<Vec<ChartEntry>>> {
    let (start, end) = weekly_window(Utc::now());
    let rows = ReportRepo::daily_counts(&state.pool, start, end).await?;

    let entries = rows
        .into_iter()
        .map(|row| ChartEntry {
            name: day_label(row.day),
            total_reports: row.total,
        })
        .collect();

    Ok(Json(entries))
}

/// GET /api/reports/{id}
///
/// Full report detail: resolved users, the reply thread with resolved
/// senders, the status history, and attachment records.
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ReportDetail>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    let replies = ReportRepo::list_replies(&state.pool, id).await?;
    let status_history = ReportRepo::list_history(&state.pool, id).await?;
    let attachments = ReportRepo::list_attachments(&state.pool, id).await?;

    let mut ids: Vec<DbId> = vec![report.user_id];
    ids.extend(report.validated_by);
    ids.extend(report.handled_by);
    ids.extend(replies.iter().map(|r| r.sender_id));
    ids.sort_unstable();
    ids.dedup();

    let users = user_map(&state, &ids).await?;

    let replies = replies
        .into_iter()
        .map(|reply| {
            let sender = users.get(&reply.sender_id).cloned();
            ReplyView { reply, sender }
        })
        .collect();

    let user = users.get(&report.user_id).cloned();
    let validator = report.validated_by.and_then(|id| users.get(&id).cloned());
    let handler = report.handled_by.and_then(|id| users.get(&id).cloned());

    Ok(Json(ReportDetail {
        report,
        user,
        validator,
        handler,
        replies,
        status_history,
        attachments,
    }))
}

// ---------------------------------------------------------------------------
// Mutation handlers
// ---------------------------------------------------------------------------

/// POST /api/reports
///
/// Create a report from a multipart form: `title`, `description`,
/// `category` fields plus an optional `image` file written to the upload
/// directory under a unique name.
pub async fn create_report(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Report>)> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category: Option<String> = None;
    let mut attachment_path: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        // Field accessors consume the field, so take the name first.
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("category") => category = Some(field.text().await?),
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }
                attachment_path =
                    Some(save_upload(&state.config.upload_dir, &filename, &bytes).await?);
            }
            _ => {}
        }
    }

    let title =
        title.ok_or_else(|| AppError::Core(CoreError::Validation("title is required".into())))?;
    let description = description.ok_or_else(|| {
        AppError::Core(CoreError::Validation("description is required".into()))
    })?;
    let category = category
        .ok_or_else(|| AppError::Core(CoreError::Validation("category is required".into())))?;
    validate_category(&category)?;

    let report = ReportRepo::create(
        &state.pool,
        user.user_id,
        &CreateReport {
            title,
            description,
            category,
        },
        attachment_path.as_deref(),
    )
    .await?;

    tracing::info!(report_id = report.id, user_id = user.user_id, "Report created");

    Ok((StatusCode::CREATED, Json(report)))
}

/// Write uploaded bytes to the upload directory under a collision-free
/// name, returning the stored relative path.
async fn save_upload(upload_dir: &str, filename: &str, bytes: &[u8]) -> AppResult<String> {
    // Keep only the final path component of the client-supplied name.
    let safe_name = FsPath::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let unique_name = format!("{}-{}", Uuid::new_v4(), safe_name);
    let path = FsPath::new(upload_dir).join(&unique_name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

    Ok(format!("{upload_dir}/{unique_name}"))
}

/// PATCH /api/reports/{id}/status
///
/// Change a report's status. The requested value is validated by the
/// status-change planner, which also decides whether to stamp the
/// validator (`validated`) or the handler (`in_progress`). A history entry
/// is appended for every change.
pub async fn update_report_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReportStatus>,
) -> AppResult<Json<Report>> {
    let change = plan_status_change(&input.status)?;

    let report = ReportRepo::update_status(&state.pool, id, &change, input.updated_by)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    tracing::info!(report_id = id, status = %report.status, "Report status updated");

    Ok(Json(report))
}

/// PATCH /api/reports/{id}/handle
///
/// Officer triage: set one of the four lifecycle statuses and record the
/// calling officer as handler.
pub async fn handle_report(
    State(state): State<AppState>,
    RequireStaff(officer): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<HandleReport>,
) -> AppResult<Json<Report>> {
    validate_status(&input.status)?;

    let report = ReportRepo::triage(&state.pool, id, &input.status, officer.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    tracing::info!(
        report_id = id,
        officer_id = officer.user_id,
        status = %report.status,
        "Report handled"
    );

    Ok(Json(report))
}

/// POST /api/reports/{id}/reply
///
/// Append a reply to the report's thread. Sender identity and role come
/// from the authenticated caller.
pub async fn add_reply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddReply>,
) -> AppResult<Json<Report>> {
    if input.message.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "message must not be empty".into(),
        )));
    }

    let report = ReportRepo::add_reply(&state.pool, id, user.user_id, &user.role, &input.message)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    Ok(Json(report))
}

/// DELETE /api/reports/{id}
///
/// Allowed for the report's owner and for staff/admin. Child rows cascade.
/// Returns 200 with a message body; existing clients read it.
pub async fn delete_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let report = ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    let is_privileged = user.role == ROLE_ADMIN || user.role == ROLE_STAFF;
    if !is_privileged && report.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the report owner or staff may delete a report".into(),
        )));
    }

    let deleted = ReportRepo::delete(&state.pool, id).await?;
    if !deleted {
        // Raced with another delete between the fetch and here.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }));
    }

    tracing::info!(report_id = id, user_id = user.user_id, "Report deleted");

    Ok(Json(serde_json::json!({ "message": "Report deleted" })))
}
