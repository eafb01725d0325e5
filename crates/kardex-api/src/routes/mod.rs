//! API routes.

pub mod asset_types;
pub mod assets;
pub mod health;

use axum::{middleware::from_fn_with_state, Router};

use crate::middleware::require_api_key;
use crate::state::AppState;

/// Creates the main API router.
///
/// Everything under `/api` sits behind the API-key gate; health endpoints
/// are open.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/api/asset-types", asset_types::routes())
        .nest("/api/assets", assets::routes())
        .layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(api)
        .merge(health::routes())
        .with_state(state)
}
