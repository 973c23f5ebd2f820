//! Integration tests for the repository layer against a real database:
//! - Unique constraint violations on user registration keys
//! - Report creation with its initial history entry
//! - Status changes, stamps, and history appends
//! - Delete semantics (idempotence, cascade)
//! - List filtering and unfiltered counting

use sqlx::PgPool;

use lapor_core::report::plan_status_change;
use lapor_db::models::report::CreateReport;
use lapor_db::models::stored_file::NewStoredFile;
use lapor_db::models::user::CreateUser;
use lapor_db::repositories::{ReportRepo, StoredFileRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(institutional_id: &str, email: &str) -> CreateUser {
    CreateUser {
        institutional_id: institutional_id.to_string(),
        name: "Test User".to_string(),
        email: email.to_string(),
        phone: "0800000000".to_string(),
        password_hash: "$argon2id$fake-hash-for-tests".to_string(),
        role: "student".to_string(),
    }
}

fn new_report(title: &str) -> CreateReport {
    CreateReport {
        title: title.to_string(),
        description: "Something is broken".to_string(),
        category: "facility".to_string(),
    }
}

/// Extract the violated constraint name from a sqlx error.
fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_owned),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Test: duplicate registration keys hit the unique constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("A001", "dup@test.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("A002", "dup@test.com"))
        .await
        .expect_err("second user with the same email must be rejected");

    assert_eq!(constraint_of(&err).as_deref(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_institutional_id_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("B001", "first@test.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("B001", "second@test.com"))
        .await
        .expect_err("second user with the same institutional id must be rejected");

    assert_eq!(
        constraint_of(&err).as_deref(),
        Some("uq_users_institutional_id")
    );
}

// ---------------------------------------------------------------------------
// Test: create report writes exactly one initial history entry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_report_writes_initial_pending_history(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("C001", "owner@test.com"))
        .await
        .unwrap();

    let report = ReportRepo::create(&pool, owner.id, &new_report("Leaking roof"), None)
        .await
        .unwrap();

    assert_eq!(report.status, "pending");
    assert_eq!(report.user_id, owner.id);

    let history = ReportRepo::list_history(&pool, report.id).await.unwrap();
    assert_eq!(history.len(), 1, "exactly one initial history entry");
    assert_eq!(history[0].status, "pending");
    assert_eq!(history[0].updated_by, Some(owner.id));
}

// ---------------------------------------------------------------------------
// Test: status changes stamp and append history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn validated_status_stamps_validator_and_appends_history(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("D001", "d-owner@test.com"))
        .await
        .unwrap();
    let admin = UserRepo::create(&pool, &new_user("D002", "d-admin@test.com"))
        .await
        .unwrap();
    let report = ReportRepo::create(&pool, owner.id, &new_report("Noisy AC"), None)
        .await
        .unwrap();

    let change = plan_status_change("validated").unwrap();
    let updated = ReportRepo::update_status(&pool, report.id, &change, admin.id)
        .await
        .unwrap()
        .expect("report exists");

    assert_eq!(updated.status, "validated");
    assert_eq!(updated.validated_by, Some(admin.id));
    assert!(updated.validated_at.is_some());
    assert_eq!(updated.handled_by, None);

    let history = ReportRepo::list_history(&pool, report.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].status, "validated");
    assert_eq!(history[1].updated_by, Some(admin.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn triage_stamps_handler_and_appends_history(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("E001", "e-owner@test.com"))
        .await
        .unwrap();
    let officer = UserRepo::create(&pool, &new_user("E002", "e-officer@test.com"))
        .await
        .unwrap();
    let report = ReportRepo::create(&pool, owner.id, &new_report("Broken chair"), None)
        .await
        .unwrap();

    let updated = ReportRepo::triage(&pool, report.id, "in_progress", officer.id)
        .await
        .unwrap()
        .expect("report exists");

    assert_eq!(updated.status, "in_progress");
    assert_eq!(updated.handled_by, Some(officer.id));

    let history = ReportRepo::list_history(&pool, report.id).await.unwrap();
    assert_eq!(history.len(), 2, "triage must append a history entry");
    assert_eq!(history[1].status, "in_progress");
    assert_eq!(history[1].updated_by, Some(officer.id));
}

// ---------------------------------------------------------------------------
// Test: delete semantics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn delete_twice_reports_absence_the_second_time(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("F001", "f-owner@test.com"))
        .await
        .unwrap();
    let report = ReportRepo::create(&pool, owner.id, &new_report("Flickering light"), None)
        .await
        .unwrap();

    assert!(ReportRepo::delete(&pool, report.id).await.unwrap());
    assert!(
        !ReportRepo::delete(&pool, report.id).await.unwrap(),
        "second delete must report nothing removed"
    );
    assert!(ReportRepo::find_by_id(&pool, report.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_report_cascades_to_children(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("G001", "g-owner@test.com"))
        .await
        .unwrap();
    let report = ReportRepo::create(&pool, owner.id, &new_report("Slow wifi"), None)
        .await
        .unwrap();

    ReportRepo::add_reply(&pool, report.id, owner.id, "student", "Any update?")
        .await
        .unwrap()
        .expect("report exists");
    let attachment = ReportRepo::attach_file(
        &pool,
        report.id,
        &NewStoredFile {
            filename: "speedtest.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        },
    )
    .await
    .unwrap()
    .expect("report exists");

    assert!(ReportRepo::delete(&pool, report.id).await.unwrap());

    assert!(ReportRepo::list_replies(&pool, report.id)
        .await
        .unwrap()
        .is_empty());
    assert!(ReportRepo::list_history(&pool, report.id)
        .await
        .unwrap()
        .is_empty());
    assert!(ReportRepo::list_attachments(&pool, report.id)
        .await
        .unwrap()
        .is_empty());
    assert!(StoredFileRepo::find_by_id(&pool, attachment.file_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn attach_file_to_missing_report_stores_nothing(pool: PgPool) {
    let record = ReportRepo::attach_file(
        &pool,
        999_999,
        &NewStoredFile {
            filename: "orphan.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![9, 9],
        },
    )
    .await
    .unwrap();
    assert!(record.is_none());

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stored_files")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0, "no orphaned file bytes may survive");
}

// ---------------------------------------------------------------------------
// Test: list filtering and unfiltered counting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn status_filter_narrows_rows_but_count_stays_unfiltered(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("H001", "h-owner@test.com"))
        .await
        .unwrap();
    let officer = UserRepo::create(&pool, &new_user("H002", "h-officer@test.com"))
        .await
        .unwrap();

    for title in ["One", "Two", "Three"] {
        ReportRepo::create(&pool, owner.id, &new_report(title), None)
            .await
            .unwrap();
    }
    let reports = ReportRepo::list_page(&pool, None, 10, 0).await.unwrap();
    ReportRepo::triage(&pool, reports[0].id, "in_progress", officer.id)
        .await
        .unwrap()
        .expect("report exists");

    let filtered = ReportRepo::list_page(&pool, Some("in_progress"), 10, 0)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(filtered.iter().all(|r| r.status == "in_progress"));

    // The total stays global even when a filter is applied.
    assert_eq!(ReportRepo::count_all(&pool).await.unwrap(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn empty_status_filter_means_no_filter(pool: PgPool) {
    let owner = UserRepo::create(&pool, &new_user("I001", "i-owner@test.com"))
        .await
        .unwrap();
    for title in ["One", "Two"] {
        ReportRepo::create(&pool, owner.id, &new_report(title), None)
            .await
            .unwrap();
    }

    let rows = ReportRepo::list_page(&pool, Some(""), 10, 0).await.unwrap();
    assert_eq!(rows.len(), 2, "empty filter string must match everything");
}
