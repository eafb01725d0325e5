//! # kardex-api
//!
//! REST API server for the Kardex asset catalog.
//!
//! This crate provides the HTTP surface over `kardex-core`: asset type and
//! asset endpoints, the shared-secret API-key gate, and error translation
//! into HTTP statuses.

pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
