//! Database schema and migrations.

use super::{DbError, DbPool};

/// Runs database migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    use tracing::info;

    match pool {
        DbPool::Sqlite(pool) => {
            info!("Running SQLite migrations");
            sqlx::migrate!("src/db/migrations/sqlite").run(pool).await?;
        }
        DbPool::Postgres(pool) => {
            info!("Running PostgreSQL migrations");
            sqlx::migrate!("src/db/migrations/postgres")
                .run(pool)
                .await?;
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

/// SQL statements for creating the schema (used for documentation and manual setup).
#[allow(dead_code)]
pub mod sql {
    /// SQL to create the asset_fields table.
    pub const CREATE_ASSET_FIELDS_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS asset_fields (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            field_type TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL,
            CONSTRAINT uq_asset_field_name UNIQUE (name)
        );
    "#;

    /// SQL to create the asset_types table and field membership join table.
    pub const CREATE_ASSET_TYPES_TABLES: &str = r#"
        CREATE TABLE IF NOT EXISTS asset_types (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS asset_type_fields (
            asset_type_id BIGINT NOT NULL REFERENCES asset_types(id),
            asset_field_id BIGINT NOT NULL REFERENCES asset_fields(id),
            PRIMARY KEY (asset_type_id, asset_field_id)
        );
    "#;

    /// SQL to create the assets and asset_values tables.
    pub const CREATE_ASSETS_TABLES: &str = r#"
        CREATE TABLE IF NOT EXISTS assets (
            id BIGSERIAL PRIMARY KEY,
            asset_type_id BIGINT NOT NULL REFERENCES asset_types(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS asset_values (
            id BIGSERIAL PRIMARY KEY,
            asset_id BIGINT NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
            field_id BIGINT NOT NULL REFERENCES asset_fields(id),
            text_value TEXT,
            number_value DOUBLE PRECISION,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL,
            CONSTRAINT uq_asset_field_value UNIQUE (asset_id, field_id)
        );

        CREATE INDEX IF NOT EXISTS idx_assets_asset_type_id ON assets(asset_type_id);
        CREATE INDEX IF NOT EXISTS idx_asset_values_asset_id ON asset_values(asset_id);
    "#;
}
