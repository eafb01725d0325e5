//! Asset repository for database operations.
//!
//! Value writes go through the dynamic attribute engine: each (name, raw)
//! pair is resolved against the asset's type and coerced into the slot the
//! field declares, all inside the request's transaction. Any unknown field
//! or failed coercion rolls the whole transaction back, so no partially
//! written asset is ever observable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::type_repo::{parse_timestamp, PgFieldRow, SqliteFieldRow};
use super::{DbError, DbPool};
use crate::attrs::{coerce_value, resolve_field};
use crate::catalog::{Asset, AssetType, AssetValue};
use crate::error::CatalogError;

/// A name → raw value mapping applied to an asset.
pub type FieldValues = serde_json::Map<String, Value>;

/// Filter for listing assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetFilter {
    /// Restrict to assets bound to this type.
    pub asset_type_id: Option<i64>,
}

/// Repository trait for asset persistence.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Lists assets, optionally filtered by type.
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, CatalogError>;

    /// Gets an asset by id with its stored values.
    async fn get(&self, id: i64) -> Result<Option<Asset>, CatalogError>;

    /// Creates an asset bound to a type and applies the initial values.
    ///
    /// All-or-nothing: a validation failure on any pair discards the asset
    /// and every value written so far.
    async fn create(&self, asset_type_id: i64, values: &FieldValues)
        -> Result<Asset, CatalogError>;

    /// Applies values to an existing asset.
    ///
    /// A validation failure rolls back all of this call's changes; values
    /// committed by earlier calls are unaffected.
    async fn update(&self, id: i64, values: &FieldValues) -> Result<Asset, CatalogError>;

    /// Deletes an asset and its value rows in one transaction.
    ///
    /// Returns false when the asset does not exist.
    async fn delete(&self, id: i64) -> Result<bool, CatalogError>;

    /// Counts assets matching a filter.
    async fn count(&self, filter: &AssetFilter) -> Result<u64, CatalogError>;
}

// ============================================================================
// SQLite implementation
// ============================================================================

/// SQLite implementation of AssetRepository.
pub struct SqliteAssetRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteAssetRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_values(&self, asset_id: i64) -> Result<Vec<AssetValue>, CatalogError> {
        let rows: Vec<SqliteValueRow> = sqlx::query_as(
            r#"
            SELECT v.text_value, v.number_value,
                   f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_values v
            JOIN asset_fields f ON f.id = v.field_id
            WHERE v.asset_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect()
    }

    /// Loads the asset's type with fields inside a transaction, so value
    /// validation sees a consistent field set.
    async fn load_type_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        type_id: i64,
    ) -> Result<Option<AssetType>, CatalogError> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types WHERE id = ?",
        )
        .bind(type_id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((id, name, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let field_rows: Vec<SqliteFieldRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(type_id)
        .fetch_all(&mut **tx)
        .await?;

        let fields = field_rows
            .into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(AssetType {
            id,
            name,
            fields,
            created_at: parse_timestamp(&created_at, "created_at").map_err(CatalogError::from)?,
            updated_at: parse_timestamp(&updated_at, "updated_at").map_err(CatalogError::from)?,
        }))
    }

    /// Resolves, coerces, and upserts one (name, raw) pair for an asset.
    async fn set_value_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        asset_id: i64,
        asset_type: &AssetType,
        name: &str,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let field = resolve_field(asset_type, name)?;
        let (text_value, number_value) = coerce_value(field, raw)?.into_slots();
        let ts = now.to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO asset_values (asset_id, field_id, text_value, number_value, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(asset_id, field_id) DO UPDATE SET
                text_value = excluded.text_value,
                number_value = excluded.number_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(asset_id)
        .bind(field.id)
        .bind(&text_value)
        .bind(number_value)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, CatalogError> {
        let rows: Vec<SqliteAssetRow> = if let Some(type_id) = filter.asset_type_id {
            sqlx::query_as(
                "SELECT id, asset_type_id, created_at, updated_at FROM assets WHERE asset_type_id = ? ORDER BY id",
            )
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, asset_type_id, created_at, updated_at FROM assets ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await?
        };

        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            let mut asset: Asset = row.try_into().map_err(CatalogError::from)?;
            asset.values = self.load_values(asset.id).await?;
            assets.push(asset);
        }
        Ok(assets)
    }

    async fn get(&self, id: i64) -> Result<Option<Asset>, CatalogError> {
        let row: Option<SqliteAssetRow> = sqlx::query_as(
            "SELECT id, asset_type_id, created_at, updated_at FROM assets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut asset: Asset = row.try_into().map_err(CatalogError::from)?;
        asset.values = self.load_values(id).await?;
        Ok(Some(asset))
    }

    async fn create(
        &self,
        asset_type_id: i64,
        values: &FieldValues,
    ) -> Result<Asset, CatalogError> {
        let now = Utc::now();
        let ts = now.to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let asset_type = Self::load_type_in_tx(&mut tx, asset_type_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "asset type",
                id: asset_type_id,
            })?;

        let result = sqlx::query(
            "INSERT INTO assets (asset_type_id, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind(asset_type_id)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        let asset_id = result.last_insert_rowid();

        for (name, raw) in values {
            Self::set_value_in_tx(&mut tx, asset_id, &asset_type, name, raw, now).await?;
        }

        tx.commit().await?;

        self.get(asset_id).await?.ok_or(CatalogError::NotFound {
            entity: "asset",
            id: asset_id,
        })
    }

    async fn update(&self, id: i64, values: &FieldValues) -> Result<Asset, CatalogError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let type_id: Option<i64> = sqlx::query_scalar("SELECT asset_type_id FROM assets WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let type_id = type_id.ok_or(CatalogError::NotFound {
            entity: "asset",
            id,
        })?;

        let asset_type = Self::load_type_in_tx(&mut tx, type_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            })?;

        for (name, raw) in values {
            Self::set_value_in_tx(&mut tx, id, &asset_type, name, raw, now).await?;
        }

        sqlx::query("UPDATE assets SET updated_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(CatalogError::NotFound {
            entity: "asset",
            id,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, CatalogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM asset_values WHERE asset_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: &AssetFilter) -> Result<u64, CatalogError> {
        let count: i64 = if let Some(type_id) = filter.asset_type_id {
            sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE asset_type_id = ?")
                .bind(type_id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM assets")
                .fetch_one(&self.pool)
                .await?
        };
        Ok(count as u64)
    }
}

// ============================================================================
// PostgreSQL implementation
// ============================================================================

/// PostgreSQL implementation of AssetRepository.
pub struct PgAssetRepository {
    pool: sqlx::PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn load_values(&self, asset_id: i64) -> Result<Vec<AssetValue>, CatalogError> {
        let rows: Vec<PgValueRow> = sqlx::query_as(
            r#"
            SELECT v.text_value, v.number_value,
                   f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_values v
            JOIN asset_fields f ON f.id = v.field_id
            WHERE v.asset_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect()
    }

    async fn load_type_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        type_id: i64,
    ) -> Result<Option<AssetType>, CatalogError> {
        let row: Option<(i64, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types WHERE id = $1",
        )
        .bind(type_id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((id, name, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let field_rows: Vec<PgFieldRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(type_id)
        .fetch_all(&mut **tx)
        .await?;

        let fields = field_rows
            .into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(AssetType {
            id,
            name,
            fields,
            created_at,
            updated_at,
        }))
    }

    async fn set_value_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        asset_id: i64,
        asset_type: &AssetType,
        name: &str,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let field = resolve_field(asset_type, name)?;
        let (text_value, number_value) = coerce_value(field, raw)?.into_slots();

        sqlx::query(
            r#"
            INSERT INTO asset_values (asset_id, field_id, text_value, number_value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (asset_id, field_id) DO UPDATE SET
                text_value = excluded.text_value,
                number_value = excluded.number_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(asset_id)
        .bind(field.id)
        .bind(&text_value)
        .bind(number_value)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, CatalogError> {
        let rows: Vec<PgAssetRow> = if let Some(type_id) = filter.asset_type_id {
            sqlx::query_as(
                "SELECT id, asset_type_id, created_at, updated_at FROM assets WHERE asset_type_id = $1 ORDER BY id",
            )
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, asset_type_id, created_at, updated_at FROM assets ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await?
        };

        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            let mut asset: Asset = row.into();
            asset.values = self.load_values(asset.id).await?;
            assets.push(asset);
        }
        Ok(assets)
    }

    async fn get(&self, id: i64) -> Result<Option<Asset>, CatalogError> {
        let row: Option<PgAssetRow> = sqlx::query_as(
            "SELECT id, asset_type_id, created_at, updated_at FROM assets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut asset: Asset = row.into();
        asset.values = self.load_values(id).await?;
        Ok(Some(asset))
    }

    async fn create(
        &self,
        asset_type_id: i64,
        values: &FieldValues,
    ) -> Result<Asset, CatalogError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let asset_type = Self::load_type_in_tx(&mut tx, asset_type_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "asset type",
                id: asset_type_id,
            })?;

        let asset_id: i64 = sqlx::query_scalar(
            "INSERT INTO assets (asset_type_id, created_at, updated_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(asset_type_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (name, raw) in values {
            Self::set_value_in_tx(&mut tx, asset_id, &asset_type, name, raw, now).await?;
        }

        tx.commit().await?;

        self.get(asset_id).await?.ok_or(CatalogError::NotFound {
            entity: "asset",
            id: asset_id,
        })
    }

    async fn update(&self, id: i64, values: &FieldValues) -> Result<Asset, CatalogError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let type_id: Option<i64> =
            sqlx::query_scalar("SELECT asset_type_id FROM assets WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let type_id = type_id.ok_or(CatalogError::NotFound {
            entity: "asset",
            id,
        })?;

        let asset_type = Self::load_type_in_tx(&mut tx, type_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            })?;

        for (name, raw) in values {
            Self::set_value_in_tx(&mut tx, id, &asset_type, name, raw, now).await?;
        }

        sqlx::query("UPDATE assets SET updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(CatalogError::NotFound {
            entity: "asset",
            id,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, CatalogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM asset_values WHERE asset_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: &AssetFilter) -> Result<u64, CatalogError> {
        let count: i64 = if let Some(type_id) = filter.asset_type_id {
            sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE asset_type_id = $1")
                .bind(type_id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM assets")
                .fetch_one(&self.pool)
                .await?
        };
        Ok(count as u64)
    }
}

/// Factory function to create the appropriate repository based on pool type.
pub fn create_asset_repository(pool: &DbPool) -> Box<dyn AssetRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetRepository::new(pool.clone())),
    }
}

// Helper structs for SQLx row mapping

#[derive(sqlx::FromRow)]
struct SqliteAssetRow {
    id: i64,
    asset_type_id: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SqliteAssetRow> for Asset {
    type Error = DbError;

    fn try_from(row: SqliteAssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            asset_type_id: row.asset_type_id,
            values: Vec::new(),
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SqliteValueRow {
    text_value: Option<String>,
    number_value: Option<f64>,
    id: i64,
    name: String,
    field_type: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SqliteValueRow> for AssetValue {
    type Error = DbError;

    fn try_from(row: SqliteValueRow) -> Result<Self, Self::Error> {
        let field = SqliteFieldRow {
            id: row.id,
            name: row.name,
            field_type: row.field_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
        .try_into()?;

        Ok(AssetValue {
            field,
            text_value: row.text_value,
            number_value: row.number_value,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgAssetRow {
    id: i64,
    asset_type_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PgAssetRow> for Asset {
    fn from(row: PgAssetRow) -> Self {
        Asset {
            id: row.id,
            asset_type_id: row.asset_type_id,
            values: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PgValueRow {
    text_value: Option<String>,
    number_value: Option<f64>,
    id: i64,
    name: String,
    field_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgValueRow> for AssetValue {
    type Error = DbError;

    fn try_from(row: PgValueRow) -> Result<Self, Self::Error> {
        let field = PgFieldRow {
            id: row.id,
            name: row.name,
            field_type: row.field_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
        .try_into()?;

        Ok(AssetValue {
            field,
            text_value: row.text_value,
            number_value: row.number_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldSpec;
    use crate::db::type_repo::SqliteAssetTypeRepository;
    use crate::db::{run_migrations, AssetTypeRepository};
    use serde_json::json;

    async fn setup() -> (SqliteAssetRepository, SqliteAssetTypeRepository) {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create SQLite pool");
        run_migrations(&DbPool::Sqlite(pool.clone()))
            .await
            .expect("Failed to run migrations");
        (
            SqliteAssetRepository::new(pool.clone()),
            SqliteAssetTypeRepository::new(pool),
        )
    }

    async fn laptop_type(types: &SqliteAssetTypeRepository) -> crate::catalog::AssetType {
        types
            .create(
                "Laptop",
                &[
                    FieldSpec {
                        name: "model".to_string(),
                        field_type: crate::catalog::FieldType::Text,
                    },
                    FieldSpec {
                        name: "ram".to_string(),
                        field_type: crate::catalog::FieldType::Number,
                    },
                ],
            )
            .await
            .unwrap()
    }

    fn values(pairs: &[(&str, Value)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_and_project_round_trip() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let asset = assets
            .create(ty.id, &values(&[("model", json!("x")), ("ram", json!(3))]))
            .await
            .unwrap();

        let data = asset.data(&ty);
        assert_eq!(data["model"], json!("x"));
        assert_eq!(data["ram"], json!(3.0));
    }

    #[tokio::test]
    async fn test_create_with_unknown_field_rolls_back() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let err = assets
            .create(
                ty.id,
                &values(&[("model", json!("x")), ("serial", json!("abc"))]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::UnknownField { field } if field == "serial"));
        assert_eq!(assets.count(&AssetFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_invalid_number_rolls_back() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let err = assets
            .create(ty.id, &values(&[("ram", json!("abc"))]))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::InvalidValue { field } if field == "ram"));
        assert_eq!(assets.count(&AssetFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_for_unknown_type() {
        let (assets, _types) = setup().await;

        let err = assets.create(99, &FieldValues::new()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { id: 99, .. }));
    }

    #[tokio::test]
    async fn test_update_failure_preserves_committed_values() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let asset = assets
            .create(ty.id, &values(&[("ram", json!(8))]))
            .await
            .unwrap();

        let err = assets
            .update(asset.id, &values(&[("ram", json!(16)), ("bogus", json!(1))]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownField { .. }));

        let reloaded = assets.get(asset.id).await.unwrap().unwrap();
        assert_eq!(
            crate::attrs::get_field_value(&reloaded.values, "ram"),
            Some(json!(8.0))
        );
    }

    #[tokio::test]
    async fn test_update_overwrites_slot_and_clears_other() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let asset = assets
            .create(ty.id, &values(&[("ram", json!("42"))]))
            .await
            .unwrap();

        let updated = assets
            .update(asset.id, &values(&[("ram", json!(64))]))
            .await
            .unwrap();

        // Still exactly one value row for the field.
        assert_eq!(updated.values.len(), 1);
        assert_eq!(updated.values[0].number_value, Some(64.0));
        assert_eq!(updated.values[0].text_value, None);
    }

    #[tokio::test]
    async fn test_update_unknown_asset() {
        let (assets, _types) = setup().await;

        let err = assets.update(5, &FieldValues::new()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound { entity: "asset", id: 5 }
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_value_rows() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let asset = assets
            .create(ty.id, &values(&[("model", json!("x"))]))
            .await
            .unwrap();

        assert!(assets.delete(asset.id).await.unwrap());
        assert!(assets.get(asset.id).await.unwrap().is_none());
        assert!(!assets.delete(asset.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let (assets, types) = setup().await;
        let laptops = laptop_type(&types).await;
        let monitors = types.create("Monitor", &[]).await.unwrap();

        assets.create(laptops.id, &FieldValues::new()).await.unwrap();
        assets.create(laptops.id, &FieldValues::new()).await.unwrap();
        assets.create(monitors.id, &FieldValues::new()).await.unwrap();

        let all = assets.list(&AssetFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let filtered = assets
            .list(&AssetFilter {
                asset_type_id: Some(laptops.id),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|a| a.asset_type_id == laptops.id));
    }

    #[tokio::test]
    async fn test_fields_added_later_project_as_null() {
        let (assets, types) = setup().await;
        let ty = laptop_type(&types).await;

        let asset = assets
            .create(ty.id, &values(&[("model", json!("x"))]))
            .await
            .unwrap();

        types
            .add_field(ty.id, "warranty", crate::catalog::FieldType::Text)
            .await
            .unwrap();
        let ty = types.get(ty.id).await.unwrap().unwrap();

        let data = asset.data(&ty);
        assert_eq!(data["warranty"], Value::Null);
        assert_eq!(data["model"], json!("x"));
    }
}
