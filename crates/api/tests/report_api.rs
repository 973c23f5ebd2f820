//! HTTP-level integration tests for the `/api/reports` endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{auth_token, body_json, build_test_app, delete_auth, get, post_json_auth};
use sqlx::PgPool;

use lapor_api::auth::password::hash_password;
use lapor_db::models::report::{CreateReport, Report};
use lapor_db::models::user::{CreateUser, User};
use lapor_db::repositories::{ReportRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, institutional_id: &str, role: &str) -> User {
    let hashed = hash_password("test_password_123").expect("hashing should succeed");
    let input = CreateUser {
        institutional_id: institutional_id.to_string(),
        name: format!("User {institutional_id}"),
        email: format!("{institutional_id}@test.com"),
        phone: "0800000000".to_string(),
        password_hash: hashed,
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

async fn seed_report(pool: &PgPool, owner: &User, title: &str) -> Report {
    let input = CreateReport {
        title: title.to_string(),
        description: "Something is broken".to_string(),
        category: "facility".to_string(),
    };
    ReportRepo::create(pool, owner.id, &input, None)
        .await
        .expect("report creation should succeed")
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// The owner deleting a report gets 200 with a confirmation message; a
/// repeat delete gets 404, never 500.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_owner_delete_returns_200_then_404(pool: PgPool) {
    let owner = seed_user(&pool, "S300", "student").await;
    let report = seed_report(&pool, &owner, "Broken projector").await;
    let app = build_test_app(pool);

    let token = auth_token(owner.id, "student");
    let uri = format!("/api/reports/{}", report.id);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Report deleted");

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A student who does not own the report cannot delete it.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_owner_student_cannot_delete(pool: PgPool) {
    let owner = seed_user(&pool, "S310", "student").await;
    let other = seed_user(&pool, "S311", "student").await;
    let report = seed_report(&pool, &owner, "Clogged drain").await;
    let app = build_test_app(pool.clone());

    let token = auth_token(other.id, "student");
    let response = delete_auth(app, &format!("/api/reports/{}", report.id), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let still_there = ReportRepo::find_by_id(&pool, report.id)
        .await
        .expect("lookup should succeed");
    assert!(still_there.is_some(), "report must survive a forbidden delete");
}

/// Staff may delete any report.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_staff_can_delete_any_report(pool: PgPool) {
    let owner = seed_user(&pool, "S320", "student").await;
    let staff = seed_user(&pool, "T320", "staff").await;
    let report = seed_report(&pool, &owner, "Flooded hallway").await;
    let app = build_test_app(pool);

    let token = auth_token(staff.id, "staff");
    let response = delete_auth(app, &format!("/api/reports/{}", report.id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// The list envelope reports the unfiltered total even with a status filter.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_total_items_stays_unfiltered(pool: PgPool) {
    let owner = seed_user(&pool, "S330", "student").await;
    let staff = seed_user(&pool, "T330", "staff").await;
    for title in ["One", "Two", "Three"] {
        seed_report(&pool, &owner, title).await;
    }
    let first = ReportRepo::list_page(&pool, None, 10, 0)
        .await
        .expect("listing should succeed")[0]
        .id;
    ReportRepo::triage(&pool, first, "in_progress", staff.id)
        .await
        .expect("triage should succeed");
    let app = build_test_app(pool);

    let response = get(app, "/api/reports?status=in_progress").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["totalItems"], 3, "count stays global under a filter");
    assert_eq!(json["summary"]["pending"], 2);
    assert_eq!(json["summary"]["in_progress"], 1);
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Reply sender identity comes from the token, not from the request body.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reply_sender_derived_from_token(pool: PgPool) {
    let owner = seed_user(&pool, "S340", "student").await;
    let report = seed_report(&pool, &owner, "Noisy generator").await;
    let app = build_test_app(pool.clone());

    let token = auth_token(owner.id, "student");
    let body = serde_json::json!({ "message": "Any progress on this?" });
    let response = post_json_auth(
        app,
        &format!("/api/reports/{}/reply", report.id),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let replies = ReportRepo::list_replies(&pool, report.id)
        .await
        .expect("listing replies should succeed");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].sender_id, owner.id);
    assert_eq!(replies[0].sender_role, "student");
}
