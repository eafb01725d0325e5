//! Catalog data models.
//!
//! These structs mirror the relational shape of the catalog: field
//! definitions are global and shared across asset types, asset types own a
//! set of field references, and assets own one value row per field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primitive type of a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free-form text, stored in the value's text slot.
    Text,
    /// Floating-point number, stored in the value's number slot.
    Number,
}

impl FieldType {
    /// Returns the database-compatible string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
        }
    }

    /// Parses a FieldType from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// A field definition, unique by name across the whole catalog.
///
/// The declared type is immutable once created; the same field may belong
/// to any number of asset types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    /// Unique identifier.
    pub id: i64,
    /// Globally unique, case-sensitive name.
    pub name: String,
    /// Declared primitive type.
    pub field_type: FieldType,
    /// Timestamp when the field was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the field was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A requested (name, type) pair when creating a type or adding a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Requested primitive type. Ignored when a field with this name
    /// already exists; the existing definition wins.
    pub field_type: FieldType,
}

/// A named asset type composed of a set of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetType {
    /// Unique identifier.
    pub id: i64,
    /// Unique type name.
    pub name: String,
    /// Member fields. Set semantics: no field appears twice.
    pub fields: Vec<FieldDef>,
    /// Timestamp when the type was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the type was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AssetType {
    /// Looks up a member field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true when a field with this name is a member of the type.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// A stored value for one (asset, field) pair.
///
/// Exactly one slot is populated, matching the field's declared type; the
/// other slot is always cleared on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetValue {
    /// The field this value belongs to.
    pub field: FieldDef,
    /// Text payload, populated for `text` fields.
    pub text_value: Option<String>,
    /// Numeric payload, populated for `number` fields.
    pub number_value: Option<f64>,
}

impl AssetValue {
    /// Returns the stored payload as JSON, selected by the field's type.
    pub fn value(&self) -> serde_json::Value {
        match self.field.field_type {
            FieldType::Text => self
                .text_value
                .as_deref()
                .map(Into::into)
                .unwrap_or(serde_json::Value::Null),
            FieldType::Number => self
                .number_value
                .and_then(|n| serde_json::Number::from_f64(n).map(serde_json::Value::Number))
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

/// An asset: an instance of an asset type with concrete field values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier.
    pub id: i64,
    /// The owning type. Immutable after creation.
    pub asset_type_id: i64,
    /// Stored values, at most one per field.
    pub values: Vec<AssetValue>,
    /// Timestamp when the asset was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the asset was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Materializes the name → value view of this asset against its type's
    /// current field set. See [`crate::attrs::project_all_fields`].
    pub fn data(&self, asset_type: &AssetType) -> serde_json::Map<String, serde_json::Value> {
        crate::attrs::project_all_fields(&asset_type.fields, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: i64, name: &str, field_type: FieldType) -> FieldDef {
        FieldDef {
            id,
            name: name.to_string(),
            field_type,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_field_type_db_round_trip() {
        assert_eq!(FieldType::Text.as_db_str(), "text");
        assert_eq!(FieldType::Number.as_db_str(), "number");
        assert_eq!(FieldType::from_db_str("text"), Some(FieldType::Text));
        assert_eq!(FieldType::from_db_str("number"), Some(FieldType::Number));
        assert_eq!(FieldType::from_db_str("boolean"), None);
    }

    #[test]
    fn test_field_lookup_is_case_sensitive() {
        let ty = AssetType {
            id: 1,
            name: "Laptop".to_string(),
            fields: vec![field(1, "ram", FieldType::Number)],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(ty.has_field("ram"));
        assert!(!ty.has_field("RAM"));
        assert!(ty.field("cpu").is_none());
    }

    #[test]
    fn test_value_selects_slot_by_field_type() {
        let text = AssetValue {
            field: field(1, "model", FieldType::Text),
            text_value: Some("XPS 13".to_string()),
            number_value: None,
        };
        assert_eq!(text.value(), serde_json::json!("XPS 13"));

        let number = AssetValue {
            field: field(2, "ram", FieldType::Number),
            text_value: None,
            number_value: Some(16.0),
        };
        assert_eq!(number.value(), serde_json::json!(16.0));

        let unset = AssetValue {
            field: field(2, "ram", FieldType::Number),
            text_value: None,
            number_value: None,
        };
        assert_eq!(unset.value(), serde_json::Value::Null);
    }
}
