//! Health check endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::dto::{DatabaseHealth, HealthResponse, ReadyResponse};
use crate::state::AppState;

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub(crate) async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = state.db.is_healthy().await;

    let status = if db_healthy { "healthy" } else { "unhealthy" };
    let http_status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseHealth {
                connected: db_healthy,
                backend: state.db.db_type().to_string(),
            },
        }),
    )
}

/// Readiness check endpoint.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Ready to accept requests", body = ReadyResponse),
        (status = 503, description = "Not ready", body = ReadyResponse)
    ),
    tag = "Health"
)]
pub(crate) async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadyResponse>) {
    let ready = state.db.is_healthy().await;
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(ReadyResponse { ready }))
}
