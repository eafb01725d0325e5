//! Common test utilities for integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use kardex_api::routes;
use kardex_api::state::AppState;
use kardex_core::db::{run_migrations, DbPool};

/// API key configured on every test router.
pub const TEST_API_KEY: &str = "test-api-key";

/// Creates an in-memory SQLite database with all migrations applied.
///
/// Each call uses a unique shared-cache name, so tests stay isolated when
/// run in parallel.
pub async fn setup_test_db() -> SqlitePool {
    let unique_id = Uuid::new_v4();
    let db_url = format!("sqlite:file:kardex_test_{}?mode=memory&cache=shared", unique_id);

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("Failed to create SQLite pool");

    run_migrations(&DbPool::Sqlite(pool.clone()))
        .await
        .expect("Failed to run migrations");

    pool
}

/// Creates an AppState with a test database.
pub async fn create_test_state() -> AppState {
    let pool = setup_test_db().await;
    AppState::new(DbPool::Sqlite(pool), TEST_API_KEY)
}

/// Creates a test router with the API-key gate in place.
pub async fn create_test_router() -> (Router, AppState) {
    let state = create_test_state().await;
    let router = routes::create_router(state.clone());
    (router, state)
}

/// Helper to make GET requests with the test API key.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("X-API-KEY", TEST_API_KEY)
        .body(Body::empty())
        .unwrap()
}

/// Helper to make GET requests without any credential.
pub fn get_request_no_auth(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to make GET requests with an explicit credential.
pub fn get_request_with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("X-API-KEY", key)
        .body(Body::empty())
        .unwrap()
}

/// Helper to make POST requests with JSON body and the test API key.
pub fn post_json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("X-API-KEY", TEST_API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make POST requests with JSON body and no credential.
pub fn post_json_request_no_auth(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make PUT requests with JSON body and the test API key.
pub fn put_json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("X-API-KEY", TEST_API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make DELETE requests with the test API key.
pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("X-API-KEY", TEST_API_KEY)
        .body(Body::empty())
        .unwrap()
}

/// Sends a request and parses the JSON response.
pub async fn send_request<T: DeserializeOwned>(
    app: Router,
    request: Request<Body>,
) -> (StatusCode, T) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: T = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "Failed to parse response: {} - Body: {:?}",
            e,
            String::from_utf8_lossy(&body)
        )
    });
    (status, parsed)
}

/// Sends a request and returns the raw response body.
pub async fn send_request_raw(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).to_string())
}

/// Creates an asset type through the API and returns its JSON.
pub async fn create_asset_type(
    app: &Router,
    name: &str,
    fields: serde_json::Value,
) -> serde_json::Value {
    let (status, body): (StatusCode, serde_json::Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/asset-types/",
            &serde_json::json!({ "name": name, "fields": fields }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "failed to create type: {body}");
    body
}

/// Creates an asset through the API and returns its JSON.
pub async fn create_asset(
    app: &Router,
    asset_type_id: i64,
    data: serde_json::Value,
) -> serde_json::Value {
    let (status, body): (StatusCode, serde_json::Value) = send_request(
        app.clone(),
        post_json_request(
            "/api/assets/",
            &serde_json::json!({ "asset_type_id": asset_type_id, "data": data }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "failed to create asset: {body}");
    body
}
