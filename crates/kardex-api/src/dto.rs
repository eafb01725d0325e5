//! Request and response DTOs for the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use kardex_core::{Asset, AssetType, FieldDef, FieldSpec, FieldType};

// ============================================================================
// Requests
// ============================================================================

/// A (name, type) pair in a create-type or add-field request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FieldSpecRequest {
    /// Field name.
    #[validate(length(min = 1, message = "field name must not be empty"))]
    pub name: String,
    /// Field type: `text` or `number`.
    #[schema(value_type = String, example = "text")]
    pub field_type: FieldType,
}

impl From<FieldSpecRequest> for FieldSpec {
    fn from(req: FieldSpecRequest) -> Self {
        FieldSpec {
            name: req.name,
            field_type: req.field_type,
        }
    }
}

/// Request to create an asset type.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetTypeRequest {
    /// Asset type name.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Fields of the new type.
    #[validate(nested)]
    pub fields: Vec<FieldSpecRequest>,
}

/// Request to add a field to an existing asset type.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddFieldRequest {
    /// Field name.
    #[validate(length(min = 1, message = "field name must not be empty"))]
    pub name: String,
    /// Field type: `text` or `number`.
    #[schema(value_type = String, example = "number")]
    pub field_type: FieldType,
}

/// Request to create an asset.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssetRequest {
    /// The type the new asset is bound to.
    pub asset_type_id: i64,
    /// Initial field values, keyed by field name.
    #[schema(value_type = Object)]
    pub data: serde_json::Map<String, Value>,
}

/// Request to update an asset's field values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAssetRequest {
    /// Field values to apply, keyed by field name.
    #[schema(value_type = Object)]
    pub data: serde_json::Map<String, Value>,
}

/// Query parameters for listing assets.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAssetsQuery {
    /// Restrict the listing to assets of this type.
    pub asset_type_id: Option<i64>,
}

// ============================================================================
// Responses
// ============================================================================

/// Field representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldResponse {
    pub id: i64,
    pub name: String,
    /// Field type: `text` or `number`.
    #[schema(value_type = String, example = "text")]
    pub field_type: FieldType,
}

impl From<FieldDef> for FieldResponse {
    fn from(field: FieldDef) -> Self {
        Self {
            id: field.id,
            name: field.name,
            field_type: field.field_type,
        }
    }
}

/// Asset type representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetTypeResponse {
    pub id: i64,
    pub name: String,
    pub fields: Vec<FieldResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AssetType> for AssetTypeResponse {
    fn from(ty: AssetType) -> Self {
        Self {
            id: ty.id,
            name: ty.name,
            fields: ty.fields.into_iter().map(FieldResponse::from).collect(),
            created_at: ty.created_at.to_rfc3339(),
            updated_at: ty.updated_at.to_rfc3339(),
        }
    }
}

/// Asset representation. `data` is the projection of the asset's values
/// over its type's current field set.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    pub id: i64,
    pub asset_type_id: i64,
    #[schema(value_type = Object)]
    pub data: Value,
    pub created_at: String,
    pub updated_at: String,
}

impl AssetResponse {
    /// Builds the response for an asset against its type.
    pub fn from_parts(asset: &Asset, asset_type: &AssetType) -> Self {
        Self {
            id: asset.id,
            asset_type_id: asset.asset_type_id,
            data: Value::Object(asset.data(asset_type)),
            created_at: asset.created_at.to_rfc3339(),
            updated_at: asset.updated_at.to_rfc3339(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Database connectivity.
    pub database: DatabaseHealth,
}

/// Database health details.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
    /// Whether the database answered a probe query.
    pub connected: bool,
    /// Backend kind: `sqlite` or `postgres`.
    pub backend: String,
}

/// Readiness check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept requests.
    pub ready: bool,
}
