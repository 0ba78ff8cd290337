//! # solrsync-types
//!
//! Shared domain types for solrsync.
//!
//! This crate defines the vocabulary the engine speaks on both sides of the
//! boundary:
//! - `Field`: a logical column as the tabular data source declares it
//! - `IndexField`: the same column as the search engine materializes it
//! - `FieldType`: the fixed native-type to index-type mapping table
//! - `Record`: one row/document as an arbitrary JSON object
//!
//! No I/O happens here; everything is pure data.

pub mod field;
pub mod record;

pub use field::{
    is_default_field, Field, FieldType, IndexField, UnsupportedType, DEFAULT_FIELDS,
};
pub use record::{record_from_pairs, Record};
