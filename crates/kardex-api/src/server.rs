//! API server implementation.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dto::{
    AddFieldRequest, AssetResponse, AssetTypeResponse, CreateAssetRequest, CreateAssetTypeRequest,
    DatabaseHealth, FieldResponse, FieldSpecRequest, HealthResponse, ReadyResponse,
    UpdateAssetRequest,
};
use crate::error::ErrorResponse;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::routes;
use crate::state::AppState;

/// Default request body size limit (1 MB).
const DEFAULT_REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Enable Swagger UI.
    pub enable_swagger: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_secs(30),
            enable_swagger: true,
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::asset_types::list_asset_types,
        crate::routes::asset_types::create_asset_type,
        crate::routes::asset_types::get_asset_type,
        crate::routes::asset_types::list_fields,
        crate::routes::asset_types::add_field,
        crate::routes::assets::list_assets,
        crate::routes::assets::create_asset,
        crate::routes::assets::get_asset,
        crate::routes::assets::update_asset,
        crate::routes::assets::delete_asset,
    ),
    components(
        schemas(
            HealthResponse,
            DatabaseHealth,
            ReadyResponse,
            FieldSpecRequest,
            CreateAssetTypeRequest,
            AddFieldRequest,
            CreateAssetRequest,
            UpdateAssetRequest,
            FieldResponse,
            AssetTypeResponse,
            AssetResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Asset Types", description = "Asset type and field administration"),
        (name = "Assets", description = "Asset management"),
    ),
    info(
        title = "Kardex API",
        version = "0.1.0",
        description = "A RESTful API for managing different types of assets with flexible schemas",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server.
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Creates a new API server with default configuration.
    pub fn with_state(state: AppState) -> Self {
        Self::new(state, ApiServerConfig::default())
    }

    /// Builds the router.
    pub fn router(&self) -> Router {
        let mut app = routes::create_router(self.state.clone());

        if self.config.enable_swagger {
            app = app
                .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        // Apply middleware (order matters: innermost first)
        app.layer(middleware::from_fn(request_logging))
            .layer(middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(RequestBodyLimitLayer::new(DEFAULT_REQUEST_BODY_LIMIT))
            .layer(cors_layer())
            .layer(CatchPanicLayer::new())
    }

    /// Runs the server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr = self.config.bind_address;

        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }
}

/// Default shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kardex_core::db::create_pool;

    #[tokio::test]
    async fn test_router_creation() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let state = AppState::new(pool, "test-key");

        let server = ApiServer::with_state(state);
        let _router = server.router();
    }
}
