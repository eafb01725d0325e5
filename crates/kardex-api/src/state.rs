//! Application state shared across handlers.

use std::sync::Arc;

use kardex_core::db::DbPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DbPool>,
    /// Shared secret clients must present in the API-key header.
    pub api_key: Arc<String>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(db: DbPool, api_key: impl Into<String>) -> Self {
        Self {
            db: Arc::new(db),
            api_key: Arc::new(api_key.into()),
        }
    }
}
