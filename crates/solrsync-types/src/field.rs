//! Field definitions on both sides of the index boundary.
//!
//! A `Field` is a column as the data source declares it (native type name);
//! an `IndexField` is the materialized counterpart in a core's schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index field names reserved by the engine itself.
///
/// These are provisioned by the core's config set and maintained by the index
/// (identity, optimistic-concurrency version, ingestion timestamp). They are
/// never diffed, created, or removed by schema synchronization.
pub const DEFAULT_FIELDS: [&str; 3] = ["_id", "_version_", "indexed_ts"];

/// Whether `name` is one of the reserved, engine-managed field names.
pub fn is_default_field(name: &str) -> bool {
    DEFAULT_FIELDS.contains(&name)
}

/// No index type exists for a native column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no index type mapping for native type '{native}'")]
pub struct UnsupportedType {
    /// The native type name that failed to map.
    pub native: String,
}

/// Index-side field types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    Double,
    Text,
    Binary,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Text => "text",
            FieldType::Binary => "binary",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }

    /// Map a data-source native type name to its index field type.
    ///
    /// The table is keyed to Postgres type names so that type extensions on
    /// the data-source side (e.g. table designer interfaces) resolve here.
    /// Geometric, array, and object types are not yet mapped.
    pub fn from_native(native: &str) -> Result<Self, UnsupportedType> {
        match native {
            // numeric
            "smallint" | "integer" | "bigint" | "smallserial" | "serial" | "bigserial" => {
                Ok(FieldType::Int)
            }
            "decimal" | "numeric" => Ok(FieldType::Float),
            "real" | "double precision" => Ok(FieldType::Double),
            // monetary
            "money" => Ok(FieldType::Float),
            // character
            "character varying" | "varchar" | "character" | "char" | "bpchar" | "text" => {
                Ok(FieldType::Text)
            }
            // binary
            "bytea" => Ok(FieldType::Binary),
            // temporal
            "timestamp" | "date" | "time" | "interval" => Ok(FieldType::Date),
            // boolean
            "boolean" => Ok(FieldType::Boolean),
            _ => Err(UnsupportedType {
                native: native.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical column as declared by the tabular data source.
///
/// Unique by `id` within one table's field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Logical column name.
    pub id: String,
    /// Native type name on the data-source side.
    #[serde(rename = "type")]
    pub type_: String,
}

impl Field {
    pub fn new(id: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: type_.into(),
        }
    }
}

/// A field as materialized in a core's live schema.
///
/// Unique by `name` within one core. Serializes to the engine's schema-API
/// field representation; extra keys the engine reports are ignored on read.
/// The type is a plain string because live schemas carry engine-defined types
/// (e.g. `plong` on `_version_`) outside the mapped [`FieldType`] vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default = "default_flag")]
    pub stored: bool,
    #[serde(default = "default_flag")]
    pub indexed: bool,
}

/// Schema reads may omit stored/indexed when inherited from the field type.
fn default_flag() -> bool {
    true
}

impl IndexField {
    /// A freshly mapped field; new fields are always stored and indexed.
    pub fn stored_indexed(name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            name: name.into(),
            type_: type_.as_str().to_string(),
            stored: true,
            indexed: true,
        }
    }

    /// The same field with its type replaced.
    pub fn retyped(&self, type_: FieldType) -> Self {
        Self {
            type_: type_.as_str().to_string(),
            ..self.clone()
        }
    }
}
