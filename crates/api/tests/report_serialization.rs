//! Tests for the JSON shapes the report endpoints promise to clients:
//! the camelCase list envelope and the weekly chart entries.

use chrono::{TimeZone, Utc};
use lapor_api::handlers::reports::{ChartEntry, ReportPage};
use lapor_core::report::StatusSummary;
use lapor_db::models::report::{Report, ReportView};

fn sample_report() -> Report {
    let t = Utc.with_ymd_and_hms(2025, 4, 25, 10, 0, 0).unwrap();
    Report {
        id: 7,
        title: "Broken projector".to_string(),
        description: "Projector in room B204 does not turn on".to_string(),
        category: "facility".to_string(),
        status: "pending".to_string(),
        user_id: 3,
        attachment_path: None,
        validated_by: None,
        validated_at: None,
        handled_by: None,
        created_at: t,
        updated_at: t,
    }
}

#[test]
fn list_envelope_uses_camel_case_keys() {
    let page = ReportPage {
        data: vec![ReportView {
            report: sample_report(),
            user: None,
            validator: None,
            handler: None,
        }],
        total_items: 12,
        total_pages: 2,
        current_page: 1,
        summary: StatusSummary {
            pending: 5,
            in_progress: 4,
            resolved: 3,
        },
    };

    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["totalItems"], 12);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["currentPage"], 1);
    assert!(json.get("total_items").is_none(), "keys must be camelCase");

    // Summary buckets keep their snake_case status names.
    assert_eq!(json["summary"]["pending"], 5);
    assert_eq!(json["summary"]["in_progress"], 4);
    assert_eq!(json["summary"]["resolved"], 3);
}

#[test]
fn report_view_flattens_report_fields() {
    let view = ReportView {
        report: sample_report(),
        user: None,
        validator: None,
        handler: None,
    };

    let json = serde_json::to_value(&view).unwrap();

    // Report columns appear at the top level, next to the resolved users.
    assert_eq!(json["id"], 7);
    assert_eq!(json["title"], "Broken projector");
    assert_eq!(json["status"], "pending");
    assert!(json["user"].is_null());
    assert!(json.get("report").is_none(), "report must be flattened");
}

#[test]
fn chart_entry_uses_total_reports_key() {
    let entry = ChartEntry {
        name: "Friday, 25 Apr 2025".to_string(),
        total_reports: 4,
    };

    let json = serde_json::to_value(&entry).unwrap();

    assert_eq!(json["name"], "Friday, 25 Apr 2025");
    assert_eq!(json["totalReports"], 4);
}
