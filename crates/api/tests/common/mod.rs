use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use lapor_api::auth::jwt::{generate_token, JwtConfig};
use lapor_api::config::ServerConfig;
use lapor_api::router::build_app_router;
use lapor_api::state::AppState;
use lapor_core::types::DbId;

/// Signing secret shared by the test config and [`auth_token`].
const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a throwaway upload directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir()
            .join("lapor-test-uploads")
            .to_string_lossy()
            .into_owned(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            token_expiry_days: 30,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Delegates to the same [`build_app_router`] that `main.rs` uses, so
/// integration tests exercise the production middleware stack (CORS,
/// request ID, timeout, tracing, panic recovery).
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Sign a bearer token for the given user with the test secret.
pub fn auth_token(user_id: DbId, role: &str) -> String {
    generate_token(user_id, role, &test_config().jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send an unauthenticated GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an unauthenticated POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request with a bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
