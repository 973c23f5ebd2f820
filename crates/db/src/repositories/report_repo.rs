//! Repository for the `reports` table and its owned child tables
//! (`report_replies`, `report_status_history`, `report_attachments`).
//!
//! Composite writes (create + initial history, status change + history
//! append, file store + link) run inside a transaction so a report is
//! never observed without its matching history entry or attachment link.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lapor_core::report::StatusChange;
use lapor_core::types::DbId;

use crate::models::report::{
    AttachmentRecord, CreateReport, DailyCount, Reply, Report, StatusCount, StatusHistoryEntry,
};
use crate::models::stored_file::NewStoredFile;

/// Column list for `reports` queries.
const COLUMNS: &str = "id, title, description, category, status, user_id, attachment_path, \
                       validated_by, validated_at, handled_by, created_at, updated_at";

/// Column list for `report_replies` queries.
const REPLY_COLUMNS: &str = "id, report_id, sender_id, sender_role, message, created_at";

/// Column list for `report_status_history` queries.
const HISTORY_COLUMNS: &str = "id, report_id, status, updated_by, updated_at";

/// Column list for `report_attachments` queries.
const ATTACHMENT_COLUMNS: &str = "id, report_id, file_id, filename, uploaded_at";

/// Provides CRUD operations for reports and their embedded records.
pub struct ReportRepo;

impl ReportRepo {
    /// Create a new report owned by `user_id` with status `pending` and a
    /// single initial history entry attributed to the owner.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReport,
        attachment_path: Option<&str>,
    ) -> Result<Report, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO reports (title, description, category, status, user_id, attachment_path)
             VALUES ($1, $2, $3, 'pending', $4, $5)
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(user_id)
            .bind(attachment_path)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO report_status_history (report_id, status, updated_by)
             VALUES ($1, 'pending', $2)",
        )
        .bind(report.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(report)
    }

    /// Find a report by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of reports, newest first, optionally filtered by status.
    /// An empty filter string means no filter.
    pub async fn list_page(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let status = status.filter(|s| !s.is_empty());
        let where_clause = if status.is_some() {
            "WHERE status = $3"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM reports {where_clause} \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );

        let mut q = sqlx::query_as::<_, Report>(&query).bind(limit).bind(offset);
        if let Some(s) = status {
            q = q.bind(s);
        }
        q.fetch_all(pool).await
    }

    /// One page of a single user's reports, newest first.
    pub async fn list_page_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of reports, unfiltered.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(pool)
            .await
    }

    /// Total number of one user's reports.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// `(status, count)` aggregation rows, optionally scoped to one user.
    pub async fn status_counts(
        pool: &PgPool,
        user_id: Option<DbId>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        match user_id {
            Some(uid) => {
                sqlx::query_as::<_, StatusCount>(
                    "SELECT status, COUNT(*) AS count FROM reports \
                     WHERE user_id = $1 GROUP BY status",
                )
                .bind(uid)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, StatusCount>(
                    "SELECT status, COUNT(*) AS count FROM reports GROUP BY status",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Apply a planned status change: overwrite the status, stamp the
    /// validator / handler as the plan dictates, and append a history
    /// entry, all in one transaction.
    ///
    /// Returns `None` if no report with the given `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        change: &StatusChange,
        updated_by: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE reports SET
                status = $2,
                updated_at = NOW(),
                validated_by = CASE WHEN $3 THEN $4 ELSE validated_by END,
                validated_at = CASE WHEN $3 THEN NOW() ELSE validated_at END,
                handled_by   = CASE WHEN $5 THEN $4 ELSE handled_by END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(&change.status)
            .bind(change.stamp_validator)
            .bind(updated_by)
            .bind(change.stamp_handler)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            // Nothing to roll back; the transaction drops harmlessly.
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO report_status_history (report_id, status, updated_by)
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(&change.status)
        .bind(updated_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(report))
    }

    /// Officer triage: set the status, record the officer as handler, and
    /// append a history entry in one transaction.
    pub async fn triage(
        pool: &PgPool,
        id: DbId,
        status: &str,
        officer_id: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE reports SET status = $2, handled_by = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(status)
            .bind(officer_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO report_status_history (report_id, status, updated_by)
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(status)
        .bind(officer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(report))
    }

    /// Append a reply and bump the report's `updated_at`.
    ///
    /// Returns the updated report, or `None` if it does not exist.
    pub async fn add_reply(
        pool: &PgPool,
        report_id: DbId,
        sender_id: DbId,
        sender_role: &str,
        message: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE reports SET updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(report_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO report_replies (report_id, sender_id, sender_role, message)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(report_id)
        .bind(sender_id)
        .bind(sender_role)
        .bind(message)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(report))
    }

    /// Hard-delete a report (child rows cascade). Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All replies for a report, oldest first.
    pub async fn list_replies(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<Reply>, sqlx::Error> {
        let query = format!(
            "SELECT {REPLY_COLUMNS} FROM report_replies \
             WHERE report_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Reply>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Full status history for a report, oldest first.
    pub async fn list_history(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM report_status_history \
             WHERE report_id = $1 ORDER BY updated_at ASC, id ASC"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// All attachment records for a report, oldest first.
    pub async fn list_attachments(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<AttachmentRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM report_attachments \
             WHERE report_id = $1 ORDER BY uploaded_at ASC, id ASC"
        );
        sqlx::query_as::<_, AttachmentRecord>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Store uploaded file bytes and link them to the report in a single
    /// transaction, so no orphaned file survives a failed link.
    ///
    /// Returns `None` (storing nothing) if the report does not exist.
    pub async fn attach_file(
        pool: &PgPool,
        report_id: DbId,
        file: &NewStoredFile,
    ) -> Result<Option<AttachmentRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM reports WHERE id = $1")
            .bind(report_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let file_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO stored_files (id, filename, content_type, data)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(file_id)
        .bind(&file.filename)
        .bind(&file.content_type)
        .bind(&file.data)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO report_attachments (report_id, file_id, filename)
             VALUES ($1, $2, $3)
             RETURNING {ATTACHMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, AttachmentRecord>(&query)
            .bind(report_id)
            .bind(file_id)
            .bind(&file.filename)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE reports SET updated_at = NOW() WHERE id = $1")
            .bind(report_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    /// Per-day report counts inside the inclusive `[start, end]` window.
    /// Days with no reports produce no row.
    pub async fn daily_counts(
        pool: &PgPool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS total \
             FROM reports \
             WHERE created_at >= $1 AND created_at <= $2 \
             GROUP BY day \
             ORDER BY day ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }
}
