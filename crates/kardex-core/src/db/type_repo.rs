//! Asset type repository for database operations.
//!
//! Also hosts the field catalog: `ensure_field` resolves a field name to
//! its canonical definition, creating it on first reference. Fields are
//! never deleted or renamed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{DbError, DbPool};
use crate::catalog::{AssetType, FieldDef, FieldSpec, FieldType};
use crate::error::CatalogError;

/// Repository trait for asset type persistence.
#[async_trait]
pub trait AssetTypeRepository: Send + Sync {
    /// Lists all asset types with their fields.
    async fn list(&self) -> Result<Vec<AssetType>, CatalogError>;

    /// Gets an asset type by id, fields included.
    async fn get(&self, id: i64) -> Result<Option<AssetType>, CatalogError>;

    /// Creates an asset type and attaches the requested fields.
    ///
    /// Runs in one transaction: either the type and all field associations
    /// exist afterwards, or none do. Field specs resolve through the field
    /// catalog, so an existing field is reused; re-adding a field to the
    /// same type is a no-op (set semantics).
    async fn create(&self, name: &str, fields: &[FieldSpec]) -> Result<AssetType, CatalogError>;

    /// Adds a field to an existing type.
    ///
    /// Fails with [`CatalogError::DuplicateField`] when a field with this
    /// name is already a member of the type, regardless of the requested
    /// type argument.
    async fn add_field(
        &self,
        type_id: i64,
        name: &str,
        field_type: FieldType,
    ) -> Result<FieldDef, CatalogError>;

    /// Lists the fields of a type.
    async fn list_fields(&self, type_id: i64) -> Result<Vec<FieldDef>, CatalogError>;
}

// ============================================================================
// SQLite implementation
// ============================================================================

/// SQLite implementation of AssetTypeRepository.
pub struct SqliteAssetTypeRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteAssetTypeRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_fields(&self, type_id: i64) -> Result<Vec<FieldDef>, CatalogError> {
        let rows: Vec<SqliteFieldRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect()
    }
}

/// Resolves a field name to its definition inside a SQLite transaction,
/// inserting a new row on first reference.
///
/// When the name already exists, the stored definition is returned as-is;
/// a differing requested type is ignored.
pub(crate) async fn ensure_field_sqlite(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    name: &str,
    field_type: FieldType,
    now: DateTime<Utc>,
) -> Result<FieldDef, CatalogError> {
    let existing: Option<SqliteFieldRow> = sqlx::query_as(
        "SELECT id, name, field_type, created_at, updated_at FROM asset_fields WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(row) = existing {
        return row.try_into().map_err(CatalogError::from);
    }

    let ts = now.to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO asset_fields (name, field_type, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(field_type.as_db_str())
    .bind(&ts)
    .bind(&ts)
    .execute(&mut **tx)
    .await?;

    Ok(FieldDef {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        field_type,
        created_at: now,
        updated_at: now,
    })
}

#[async_trait]
impl AssetTypeRepository for SqliteAssetTypeRepository {
    async fn list(&self) -> Result<Vec<AssetType>, CatalogError> {
        let rows: Vec<SqliteAssetTypeRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut types = Vec::with_capacity(rows.len());
        for row in rows {
            let mut ty: AssetType = row.try_into().map_err(CatalogError::from)?;
            ty.fields = self.load_fields(ty.id).await?;
            types.push(ty);
        }
        Ok(types)
    }

    async fn get(&self, id: i64) -> Result<Option<AssetType>, CatalogError> {
        let row: Option<SqliteAssetTypeRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut ty: AssetType = row.try_into().map_err(CatalogError::from)?;
        ty.fields = self.load_fields(id).await?;
        Ok(Some(ty))
    }

    async fn create(&self, name: &str, fields: &[FieldSpec]) -> Result<AssetType, CatalogError> {
        let now = Utc::now();
        let ts = now.to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO asset_types (name, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        let type_id = result.last_insert_rowid();

        for spec in fields {
            let field = ensure_field_sqlite(&mut tx, &spec.name, spec.field_type, now).await?;
            sqlx::query(
                "INSERT OR IGNORE INTO asset_type_fields (asset_type_id, asset_field_id) VALUES (?, ?)",
            )
            .bind(type_id)
            .bind(field.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(type_id).await?.ok_or(CatalogError::NotFound {
            entity: "asset type",
            id: type_id,
        })
    }

    async fn add_field(
        &self,
        type_id: i64,
        name: &str,
        field_type: FieldType,
    ) -> Result<FieldDef, CatalogError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let type_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM asset_types WHERE id = ?")
            .bind(type_id)
            .fetch_optional(&mut *tx)
            .await?;
        if type_exists.is_none() {
            return Err(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            });
        }

        let member: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT f.id
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = ? AND f.name = ?
            "#,
        )
        .bind(type_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
        if member.is_some() {
            return Err(CatalogError::DuplicateField {
                field: name.to_string(),
            });
        }

        let field = ensure_field_sqlite(&mut tx, name, field_type, now).await?;

        sqlx::query(
            "INSERT INTO asset_type_fields (asset_type_id, asset_field_id) VALUES (?, ?)",
        )
        .bind(type_id)
        .bind(field.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE asset_types SET updated_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(type_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(field)
    }

    async fn list_fields(&self, type_id: i64) -> Result<Vec<FieldDef>, CatalogError> {
        let type_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM asset_types WHERE id = ?")
                .bind(type_id)
                .fetch_optional(&self.pool)
                .await?;
        if type_exists.is_none() {
            return Err(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            });
        }

        self.load_fields(type_id).await
    }
}

// ============================================================================
// PostgreSQL implementation
// ============================================================================

/// PostgreSQL implementation of AssetTypeRepository.
pub struct PgAssetTypeRepository {
    pool: sqlx::PgPool,
}

impl PgAssetTypeRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn load_fields(&self, type_id: i64) -> Result<Vec<FieldDef>, CatalogError> {
        let rows: Vec<PgFieldRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.name, f.field_type, f.created_at, f.updated_at
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.try_into().map_err(CatalogError::from))
            .collect()
    }
}

/// PostgreSQL variant of the field catalog resolution.
pub(crate) async fn ensure_field_pg(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    name: &str,
    field_type: FieldType,
    now: DateTime<Utc>,
) -> Result<FieldDef, CatalogError> {
    let existing: Option<PgFieldRow> = sqlx::query_as(
        "SELECT id, name, field_type, created_at, updated_at FROM asset_fields WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(row) = existing {
        return row.try_into().map_err(CatalogError::from);
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO asset_fields (name, field_type, created_at, updated_at) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(field_type.as_db_str())
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(FieldDef {
        id,
        name: name.to_string(),
        field_type,
        created_at: now,
        updated_at: now,
    })
}

#[async_trait]
impl AssetTypeRepository for PgAssetTypeRepository {
    async fn list(&self) -> Result<Vec<AssetType>, CatalogError> {
        let rows: Vec<PgAssetTypeRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut types = Vec::with_capacity(rows.len());
        for row in rows {
            let mut ty: AssetType = row.into();
            ty.fields = self.load_fields(ty.id).await?;
            types.push(ty);
        }
        Ok(types)
    }

    async fn get(&self, id: i64) -> Result<Option<AssetType>, CatalogError> {
        let row: Option<PgAssetTypeRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM asset_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut ty: AssetType = row.into();
        ty.fields = self.load_fields(id).await?;
        Ok(Some(ty))
    }

    async fn create(&self, name: &str, fields: &[FieldSpec]) -> Result<AssetType, CatalogError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let type_id: i64 = sqlx::query_scalar(
            "INSERT INTO asset_types (name, created_at, updated_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for spec in fields {
            let field = ensure_field_pg(&mut tx, &spec.name, spec.field_type, now).await?;
            sqlx::query(
                "INSERT INTO asset_type_fields (asset_type_id, asset_field_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(type_id)
            .bind(field.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(type_id).await?.ok_or(CatalogError::NotFound {
            entity: "asset type",
            id: type_id,
        })
    }

    async fn add_field(
        &self,
        type_id: i64,
        name: &str,
        field_type: FieldType,
    ) -> Result<FieldDef, CatalogError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let type_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM asset_types WHERE id = $1")
                .bind(type_id)
                .fetch_optional(&mut *tx)
                .await?;
        if type_exists.is_none() {
            return Err(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            });
        }

        let member: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT f.id
            FROM asset_fields f
            JOIN asset_type_fields tf ON tf.asset_field_id = f.id
            WHERE tf.asset_type_id = $1 AND f.name = $2
            "#,
        )
        .bind(type_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
        if member.is_some() {
            return Err(CatalogError::DuplicateField {
                field: name.to_string(),
            });
        }

        let field = ensure_field_pg(&mut tx, name, field_type, now).await?;

        sqlx::query(
            "INSERT INTO asset_type_fields (asset_type_id, asset_field_id) VALUES ($1, $2)",
        )
        .bind(type_id)
        .bind(field.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE asset_types SET updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(type_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(field)
    }

    async fn list_fields(&self, type_id: i64) -> Result<Vec<FieldDef>, CatalogError> {
        let type_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM asset_types WHERE id = $1")
                .bind(type_id)
                .fetch_optional(&self.pool)
                .await?;
        if type_exists.is_none() {
            return Err(CatalogError::NotFound {
                entity: "asset type",
                id: type_id,
            });
        }

        self.load_fields(type_id).await
    }
}

/// Factory function to create the appropriate repository based on pool type.
pub fn create_asset_type_repository(pool: &DbPool) -> Box<dyn AssetTypeRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteAssetTypeRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgAssetTypeRepository::new(pool.clone())),
    }
}

// Helper structs for SQLx row mapping

#[derive(sqlx::FromRow)]
pub(crate) struct SqliteFieldRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) field_type: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl TryFrom<SqliteFieldRow> for FieldDef {
    type Error = DbError;

    fn try_from(row: SqliteFieldRow) -> Result<Self, Self::Error> {
        let field_type = FieldType::from_db_str(&row.field_type).ok_or_else(|| {
            DbError::Serialization(format!("Invalid field type: {}", row.field_type))
        })?;

        Ok(FieldDef {
            id: row.id,
            name: row.name,
            field_type,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SqliteAssetTypeRow {
    id: i64,
    name: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SqliteAssetTypeRow> for AssetType {
    type Error = DbError;

    fn try_from(row: SqliteAssetTypeRow) -> Result<Self, Self::Error> {
        Ok(AssetType {
            id: row.id,
            name: row.name,
            fields: Vec::new(),
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PgFieldRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) field_type: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl TryFrom<PgFieldRow> for FieldDef {
    type Error = DbError;

    fn try_from(row: PgFieldRow) -> Result<Self, Self::Error> {
        let field_type = FieldType::from_db_str(&row.field_type).ok_or_else(|| {
            DbError::Serialization(format!("Invalid field type: {}", row.field_type))
        })?;

        Ok(FieldDef {
            id: row.id,
            name: row.name,
            field_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgAssetTypeRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PgAssetTypeRow> for AssetType {
    fn from(row: PgAssetTypeRow) -> Self {
        AssetType {
            id: row.id,
            name: row.name,
            fields: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| DbError::Serialization(format!("Invalid {} timestamp: {}", column, e)))
        .map(|dt| dt.with_timezone(&Utc))
}
