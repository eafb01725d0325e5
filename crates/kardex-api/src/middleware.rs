//! HTTP middleware for the API server.
//!
//! This module provides middleware functions and layers for:
//! - The shared-secret API-key gate applied uniformly ahead of dispatch
//! - Request ID generation and propagation
//! - Request logging with timing
//! - CORS configuration

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// API key header name.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Request ID header name.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Checks a request's credential against the configured shared secret.
pub fn api_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|presented| presented == expected)
        .unwrap_or(false)
}

/// Middleware enforcing the API-key credential on every request it wraps.
///
/// Runs ahead of routing into the protected sub-tree, so no handler or
/// store access happens for an unauthenticated request. The response body
/// is a fixed wire contract.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if api_key_matches(request.headers(), &state.api_key) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "Unauthorized" })),
        )
            .into_response()
    }
}

/// Request ID extension type.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Middleware to add request ID to requests and responses.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Middleware for request logging.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed with error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

/// Creates the CORS middleware layer.
///
/// `KARDEX_CORS_ALLOWED_ORIGINS` (comma-separated) restricts the allowed
/// origins; without it any origin is allowed.
pub fn cors_layer() -> CorsLayer {
    use axum::http::HeaderName;

    let origins: Vec<HeaderValue> = std::env::var("KARDEX_CORS_ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|origin| {
                    HeaderValue::from_str(origin)
                        .map_err(|e| {
                            warn!(origin = %origin, error = %e, "Invalid CORS origin, skipping");
                            e
                        })
                        .ok()
                })
                .collect()
        })
        .unwrap_or_default();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_matches() {
        let mut headers = HeaderMap::new();
        assert!(!api_key_matches(&headers, "secret"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(!api_key_matches(&headers, "secret"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(api_key_matches(&headers, "secret"));
    }

    #[test]
    fn test_api_key_is_case_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("Secret"));
        assert!(!api_key_matches(&headers, "secret"));
    }
}
