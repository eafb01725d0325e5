//! Catalog error types.

use thiserror::Error;

use crate::db::DbError;

/// Errors surfaced by catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Referenced type or asset does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. "asset type" or "asset".
        entity: &'static str,
        /// The id that failed to resolve.
        id: i64,
    },

    /// The field is already a member of the target type's field set.
    #[error("field {field} already exists for this asset type")]
    DuplicateField {
        /// Name of the offending field.
        field: String,
    },

    /// A value was supplied for a field the asset's type does not declare.
    #[error("field {field} is not defined for this asset type")]
    UnknownField {
        /// Name of the offending field.
        field: String,
    },

    /// A raw value could not be coerced to the field's declared type.
    #[error("invalid number value for field {field}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
    },

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Db(DbError::from(err))
    }
}
