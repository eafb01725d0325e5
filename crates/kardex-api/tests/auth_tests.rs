//! API-key authentication integration tests.
//!
//! The credential gate must answer before any catalog logic runs, and a
//! valid credential with an unknown id must yield 404, never 401.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{
    create_asset_type, create_test_router, get_request, get_request_no_auth, get_request_with_key,
    post_json_request_no_auth, send_request, send_request_raw,
};

#[tokio::test]
async fn test_missing_key_is_unauthorized() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) =
        send_request(app, get_request_no_auth("/api/asset-types/")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
}

#[tokio::test]
async fn test_mismatched_key_is_unauthorized() {
    let (app, _state) = create_test_router().await;

    let (status, body): (StatusCode, Value) = send_request(
        app,
        get_request_with_key("/api/assets/", "not-the-right-key"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
}

#[tokio::test]
async fn test_all_api_endpoints_require_credential() {
    let endpoints = [
        "/api/asset-types/",
        "/api/asset-types/1/",
        "/api/asset-types/1/fields/",
        "/api/assets/",
        "/api/assets/1/",
    ];

    for endpoint in endpoints {
        let (app, _state) = create_test_router().await;
        let (status, _body) = send_request_raw(app, get_request_no_auth(endpoint)).await;
        assert_eq!(
            status,
            StatusCode::UNAUTHORIZED,
            "endpoint {} should require a credential",
            endpoint
        );
    }
}

#[tokio::test]
async fn test_unauthenticated_writes_leave_no_trace() {
    let (app, _state) = create_test_router().await;

    let (status, _body) = send_request_raw(
        app.clone(),
        post_json_request_no_auth(
            "/api/asset-types/",
            &json!({ "name": "Laptop", "fields": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, types): (StatusCode, Vec<Value>) =
        send_request(app, get_request("/api/asset-types/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(types.is_empty());
}

#[tokio::test]
async fn test_valid_key_with_unknown_id_is_not_found() {
    let (app, _state) = create_test_router().await;

    let (status, _body) = send_request_raw(app.clone(), get_request("/api/asset-types/999/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _body) = send_request_raw(app, get_request("/api/assets/999/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoints_need_no_credential() {
    let (app, _state) = create_test_router().await;

    let (status, _body) = send_request_raw(app.clone(), get_request_no_auth("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = send_request_raw(app, get_request_no_auth("/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_valid_key_reaches_handlers() {
    let (app, _state) = create_test_router().await;

    let created = create_asset_type(&app, "Laptop", json!([])).await;
    assert_eq!(created["name"], "Laptop");
}
