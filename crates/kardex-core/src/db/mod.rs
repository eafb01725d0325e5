//! Database layer for Kardex.
//!
//! Persistence for field definitions, asset types, assets, and value rows
//! using SQLx, with support for both SQLite (development) and PostgreSQL
//! (production).

mod error;
mod pool;
mod schema;

pub mod asset_repo;
pub mod type_repo;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use schema::run_migrations;

// Re-export repository traits and types
pub use asset_repo::{AssetFilter, AssetRepository};
pub use type_repo::AssetTypeRepository;

// Re-export factory functions
pub use asset_repo::create_asset_repository;
pub use type_repo::create_asset_type_repository;
