//! # Supermodel Schema
//!
//! Conversion between schema documents and [`SchemaModel`](supermodel_core::SchemaModel).
//!
//! This crate provides:
//! - [`Parser`], building a model from a document through a field registry
//!   and a [`SchemaPolicy`]
//! - [`Serializer`], writing a model back out deterministically
//! - Widget hint blocks, where malformed hints are warnings rather than errors

pub mod parser;
pub mod policy;
pub mod serializer;
pub mod widgets;

pub use parser::{Parsed, Parser, SCHEMA_TAG, parse_model};
pub use policy::{
    BASES_ATTR, BaseLookup, DEFAULT_MODULE, DefaultPolicy, PolicyRegistry, SchemaPolicy,
    declared_bases, resolve_declared_bases,
};
pub use serializer::{MODEL_TAG, SCHEMA_NAMESPACE, Serializer, serialize_model};
pub use widgets::{read_widgets, write_widgets};
