//! # Supermodel Core
//!
//! Building blocks shared by the schema engine.
//!
//! This crate provides:
//! - A generic XML node tree read and written with `quick-xml`
//! - The schema model: fields, schemata, widget hints
//! - Error types for parsing and serialization

pub mod error;
pub mod model;
pub mod node;

pub use error::{ParseError, SerializeError, UnknownFieldType, WidgetWarning};
pub use model::{Field, FieldKind, Schema, SchemaModel, SchemaWidgets, WidgetHint};
pub use node::XmlNode;
