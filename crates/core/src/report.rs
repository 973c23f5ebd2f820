//! Report status / category vocabulary, the unified status-change planner,
//! and pure helpers for dashboard summaries and weekly statistics.
//!
//! Every status-mutating endpoint goes through [`plan_status_change`] so
//! that status validation and the side effects of a change (validator /
//! handler stamping, history append) are decided in exactly one place.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status for a newly submitted report.
pub const STATUS_PENDING: &str = "pending";
/// A staff member has taken the report on and is working it.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// The complaint has been addressed.
pub const STATUS_RESOLVED: &str = "resolved";
/// The report was withdrawn or rejected.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Extended marker accepted only by the status-update operation: records
/// that a validator has confirmed the report. Not part of the strict
/// lifecycle enum used by the officer triage endpoint.
pub const STATUS_VALIDATED: &str = "validated";

/// The strict report lifecycle statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_CANCELLED,
];

// ---------------------------------------------------------------------------
// Category constants
// ---------------------------------------------------------------------------

pub const CATEGORY_FACILITY: &str = "facility";
pub const CATEGORY_FACULTY: &str = "faculty";
pub const CATEGORY_SERVICE: &str = "service";
pub const CATEGORY_OTHER: &str = "other";

/// All valid report categories.
pub const VALID_CATEGORIES: &[&str] = &[
    CATEGORY_FACILITY,
    CATEGORY_FACULTY,
    CATEGORY_SERVICE,
    CATEGORY_OTHER,
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a status string is one of the strict lifecycle statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid report status '{}'. Must be one of: {:?}",
            status, VALID_STATUSES
        )))
    }
}

/// Validate that a category string is one of the known categories.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid report category '{}'. Must be one of: {:?}",
            category, VALID_CATEGORIES
        )))
    }
}

// ---------------------------------------------------------------------------
// Status-change planner
// ---------------------------------------------------------------------------

/// The outcome of planning a status change: the status to store plus the
/// stamps the persistence layer must apply alongside it.
///
/// A history entry is appended for every planned change; the planner only
/// decides which extra fields get stamped with the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// The status value to write, also recorded in the status history.
    pub status: String,
    /// Stamp `validated_by` / `validated_at` with the actor and now.
    pub stamp_validator: bool,
    /// Stamp `handled_by` with the actor.
    pub stamp_handler: bool,
}

/// Plan a status change requested through the status-update operation.
///
/// Accepts the strict lifecycle statuses plus the extended `validated`
/// marker. Any status may follow any other; no transition graph is
/// enforced because none was ever specified for this service.
pub fn plan_status_change(requested: &str) -> Result<StatusChange, CoreError> {
    match requested {
        STATUS_VALIDATED => Ok(StatusChange {
            status: requested.to_string(),
            stamp_validator: true,
            stamp_handler: false,
        }),
        STATUS_IN_PROGRESS => Ok(StatusChange {
            status: requested.to_string(),
            stamp_validator: false,
            stamp_handler: true,
        }),
        STATUS_PENDING | STATUS_RESOLVED | STATUS_CANCELLED => Ok(StatusChange {
            status: requested.to_string(),
            stamp_validator: false,
            stamp_handler: false,
        }),
        other => Err(CoreError::Validation(format!(
            "Invalid report status '{}'. Must be one of: {:?} or '{}'",
            other, VALID_STATUSES, STATUS_VALIDATED
        ))),
    }
}

// ---------------------------------------------------------------------------
// Status summary
// ---------------------------------------------------------------------------

/// Counts of reports bucketed by status, used for dashboard display.
///
/// Only the three displayed buckets are tracked; `cancelled` reports are
/// deliberately not counted, matching the dashboard the service has always
/// shipped.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

impl StatusSummary {
    /// Build a summary from `(status, count)` aggregation rows.
    ///
    /// Unknown statuses are ignored rather than rejected, since the rows
    /// come from our own aggregation query.
    pub fn from_counts<'a, I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut summary = Self::default();
        for (status, count) in counts {
            match status {
                STATUS_PENDING => summary.pending = count,
                STATUS_IN_PROGRESS => summary.in_progress = count,
                STATUS_RESOLVED => summary.resolved = count,
                _ => {}
            }
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Weekly statistics helpers
// ---------------------------------------------------------------------------

/// Compute the inclusive `[start, end]` window for the trailing-7-days
/// chart: from seven days before `now` at midnight up to the start of the
/// day after `now`.
pub fn weekly_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let start = today
        .checked_sub_days(Days::new(7))
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc();
    let end = today
        .checked_add_days(Days::new(1))
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (start, end)
}

/// Human-readable label for a chart day, e.g. `"Saturday, 25 Apr 2025"`.
pub fn day_label(day: NaiveDate) -> String {
    day.format("%A, %-d %b %Y").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
