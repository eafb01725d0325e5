//! Dynamic attribute engine.
//!
//! Field access on an asset is resolved by name against its type's current
//! field set, never by static structure. This module holds the pure pieces
//! of that model: name resolution, raw-value coercion into a typed slot,
//! and the name → value projection. Persistence of the coerced slots lives
//! in [`crate::db::asset_repo`], inside the enclosing transaction.

use serde_json::Value;

use crate::catalog::{AssetType, AssetValue, FieldDef, FieldType};
use crate::error::CatalogError;

/// A raw value coerced into the single slot its field declares.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Payload for a `text` field.
    Text(String),
    /// Payload for a `number` field.
    Number(f64),
}

impl TypedValue {
    /// Splits into `(text_value, number_value)` storage slots. The slot
    /// not matching the field's type is cleared.
    pub fn into_slots(self) -> (Option<String>, Option<f64>) {
        match self {
            TypedValue::Text(s) => (Some(s), None),
            TypedValue::Number(n) => (None, Some(n)),
        }
    }
}

/// Resolves a field name against the type's field set by exact match.
///
/// This is the extensibility guard: values can only be set for fields the
/// type declares.
pub fn resolve_field<'a>(
    asset_type: &'a AssetType,
    name: &str,
) -> Result<&'a FieldDef, CatalogError> {
    asset_type.field(name).ok_or_else(|| CatalogError::UnknownField {
        field: name.to_string(),
    })
}

/// Coerces a raw JSON value according to the field's declared type.
///
/// `text` fields store the raw value's string form. `number` fields accept
/// JSON numbers and numeric strings; anything else is an
/// [`CatalogError::InvalidValue`] naming the field.
pub fn coerce_value(field: &FieldDef, raw: &Value) -> Result<TypedValue, CatalogError> {
    match field.field_type {
        FieldType::Text => Ok(TypedValue::Text(stringify(raw))),
        FieldType::Number => parse_number(raw)
            .map(TypedValue::Number)
            .ok_or_else(|| CatalogError::InvalidValue {
                field: field.name.clone(),
            }),
    }
}

fn stringify(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Builds the name → value view of an asset.
///
/// Every field currently on the type is keyed, defaulting to null, then
/// overwritten with stored values. Stored values whose field is no longer
/// a member of the type are excluded: the projection is driven by current
/// type membership, not by what was ever written. Fields added to the type
/// after the asset was created therefore appear as null until set.
pub fn project_all_fields(
    type_fields: &[FieldDef],
    values: &[AssetValue],
) -> serde_json::Map<String, Value> {
    let mut result = serde_json::Map::with_capacity(type_fields.len());
    for field in type_fields {
        result.insert(field.name.clone(), Value::Null);
    }
    for value in values {
        if let Some(slot) = result.get_mut(&value.field.name) {
            *slot = value.value();
        }
    }
    result
}

/// Scans stored values for a field name.
///
/// Returns `None` both when the field is not on the asset's type and when
/// it is on the type but unset; callers cannot tell the two apart here.
pub fn get_field_value(values: &[AssetValue], name: &str) -> Option<Value> {
    values.iter().find(|v| v.field.name == name).map(AssetValue::value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn field(id: i64, name: &str, field_type: FieldType) -> FieldDef {
        FieldDef {
            id,
            name: name.to_string(),
            field_type,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn asset_type(fields: Vec<FieldDef>) -> AssetType {
        AssetType {
            id: 1,
            name: "Laptop".to_string(),
            fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn value(f: FieldDef, text: Option<&str>, number: Option<f64>) -> AssetValue {
        AssetValue {
            field: f,
            text_value: text.map(String::from),
            number_value: number,
        }
    }

    #[test]
    fn test_resolve_field_unknown() {
        let ty = asset_type(vec![field(1, "model", FieldType::Text)]);

        assert!(resolve_field(&ty, "model").is_ok());
        let err = resolve_field(&ty, "serial").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownField { field } if field == "serial"));
    }

    #[test]
    fn test_coerce_text_takes_string_form() {
        let f = field(1, "model", FieldType::Text);

        assert_eq!(
            coerce_value(&f, &json!("XPS 13")).unwrap(),
            TypedValue::Text("XPS 13".to_string())
        );
        assert_eq!(
            coerce_value(&f, &json!(42)).unwrap(),
            TypedValue::Text("42".to_string())
        );
        assert_eq!(
            coerce_value(&f, &json!(true)).unwrap(),
            TypedValue::Text("true".to_string())
        );
    }

    #[test]
    fn test_coerce_number_parses_numeric_strings() {
        let f = field(1, "ram", FieldType::Number);

        assert_eq!(
            coerce_value(&f, &json!(16)).unwrap(),
            TypedValue::Number(16.0)
        );
        assert_eq!(
            coerce_value(&f, &json!("42")).unwrap(),
            TypedValue::Number(42.0)
        );
        assert_eq!(
            coerce_value(&f, &json!(" 3.5 ")).unwrap(),
            TypedValue::Number(3.5)
        );
    }

    #[test]
    fn test_coerce_number_rejects_non_numeric() {
        let f = field(1, "ram", FieldType::Number);

        for raw in [json!("abc"), json!(true), json!(null), json!(["x"])] {
            let err = coerce_value(&f, &raw).unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidValue { ref field } if field == "ram"),
                "expected InvalidValue for {raw}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_typed_value_clears_other_slot() {
        assert_eq!(
            TypedValue::Text("x".to_string()).into_slots(),
            (Some("x".to_string()), None)
        );
        assert_eq!(TypedValue::Number(7.0).into_slots(), (None, Some(7.0)));
    }

    #[test]
    fn test_projection_keys_follow_type_membership() {
        let model = field(1, "model", FieldType::Text);
        let ram = field(2, "ram", FieldType::Number);
        let retired = field(3, "retired", FieldType::Text);

        // Asset has a value for `model` and for `retired`, which is no
        // longer a member of the type. `ram` was added later and never set.
        let values = vec![
            value(model.clone(), Some("XPS 13"), None),
            value(retired, Some("yes"), None),
        ];
        let projected = project_all_fields(&[model, ram], &values);

        assert_eq!(projected.len(), 2);
        assert_eq!(projected["model"], json!("XPS 13"));
        assert_eq!(projected["ram"], Value::Null);
        assert!(!projected.contains_key("retired"));
    }

    #[test]
    fn test_projection_round_trip() {
        let a = field(1, "A", FieldType::Text);
        let b = field(2, "B", FieldType::Number);
        let values = vec![
            value(a.clone(), Some("x"), None),
            value(b.clone(), None, Some(3.0)),
        ];

        let projected = project_all_fields(&[a, b], &values);
        assert_eq!(projected["A"], json!("x"));
        assert_eq!(projected["B"], json!(3.0));
    }

    #[test]
    fn test_get_field_value_scans_stored_values_only() {
        let model = field(1, "model", FieldType::Text);
        let values = vec![value(model, Some("XPS 13"), None)];

        assert_eq!(get_field_value(&values, "model"), Some(json!("XPS 13")));
        assert_eq!(get_field_value(&values, "ram"), None);
    }
}
