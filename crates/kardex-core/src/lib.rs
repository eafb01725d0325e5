//! # kardex-core
//!
//! Core catalog models and persistence for Kardex.
//!
//! This crate provides the dynamic attribute model: asset types are
//! user-defined sets of named, typed fields, and assets store one typed
//! value per field of their type. The fixed relational shape (field
//! definitions, type/field membership, value rows) lives in [`db`], the
//! name-resolution and coercion rules in [`attrs`].

pub mod attrs;
pub mod catalog;
pub mod db;
pub mod error;

pub use attrs::{coerce_value, get_field_value, project_all_fields, resolve_field, TypedValue};
pub use catalog::{Asset, AssetType, AssetValue, FieldDef, FieldSpec, FieldType};
pub use error::CatalogError;
