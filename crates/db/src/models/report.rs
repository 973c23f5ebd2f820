//! Report entity models and DTOs.
//!
//! A report exclusively owns its replies, status-history entries, and
//! attachment records; they live in child tables with `ON DELETE CASCADE`
//! and are only ever read through their parent report.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use lapor_core::types::{DbId, Timestamp};

use crate::models::user::UserPublic;

/// A row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    /// Owner; set at creation and immutable thereafter.
    pub user_id: DbId,
    /// Path of the single upload attached at creation time, if any.
    pub attachment_path: Option<String>,
    pub validated_by: Option<DbId>,
    pub validated_at: Option<Timestamp>,
    pub handled_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `report_replies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reply {
    pub id: DbId,
    pub report_id: DbId,
    pub sender_id: DbId,
    /// Derived from the authenticated sender at write time, never from
    /// client input.
    pub sender_role: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// A row from the `report_status_history` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusHistoryEntry {
    pub id: DbId,
    pub report_id: DbId,
    pub status: String,
    pub updated_by: Option<DbId>,
    pub updated_at: Timestamp,
}

/// A row from the `report_attachments` table, linking a stored file to a
/// report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttachmentRecord {
    pub id: DbId,
    pub report_id: DbId,
    pub file_id: Uuid,
    pub filename: String,
    pub uploaded_at: Timestamp,
}

/// A `(status, count)` aggregation row for the dashboard summary.
#[derive(Debug, Clone, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// A per-day aggregation row for the weekly chart.
#[derive(Debug, Clone, FromRow)]
pub struct DailyCount {
    pub day: chrono::NaiveDate,
    pub total: i64,
}

/// DTO for creating a new report.
#[derive(Debug, Deserialize)]
pub struct CreateReport {
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Query parameters for `GET /reports`.
#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// Query parameters for `GET /reports/my-report`.
#[derive(Debug, Deserialize)]
pub struct MyReportParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Request body for `PATCH /reports/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateReportStatus {
    pub status: String,
    pub updated_by: DbId,
}

/// Request body for `PATCH /reports/{id}/handle` (officer triage).
#[derive(Debug, Deserialize)]
pub struct HandleReport {
    pub status: String,
}

/// Request body for `POST /reports/{id}/reply`. Sender identity and role
/// come from the authenticated caller, not the body.
#[derive(Debug, Deserialize)]
pub struct AddReply {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Resolved views
// ---------------------------------------------------------------------------

/// A report with its related users resolved, as returned by list endpoints.
#[derive(Debug, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub user: Option<UserPublic>,
    pub validator: Option<UserPublic>,
    pub handler: Option<UserPublic>,
}

/// A reply with its sender resolved (name/email/phone/role).
#[derive(Debug, Serialize)]
pub struct ReplyView {
    #[serde(flatten)]
    pub reply: Reply,
    pub sender: Option<UserPublic>,
}

/// Full report detail: resolved users plus embedded replies, history, and
/// attachment records.
#[derive(Debug, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub user: Option<UserPublic>,
    pub validator: Option<UserPublic>,
    pub handler: Option<UserPublic>,
    pub replies: Vec<ReplyView>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub attachments: Vec<AttachmentRecord>,
}
