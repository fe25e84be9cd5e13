//! Prelude module for convenient imports.
//!
//! ```ignore
//! use supermodel::prelude::*;
//! ```

// Model types
pub use supermodel_core::{
    Field, FieldKind, ParseError, Schema, SchemaModel, SchemaWidgets, SerializeError,
    UnknownFieldType, WidgetHint, WidgetWarning, XmlNode,
};

// Field registry
pub use supermodel_fields::{CustomHandler, FieldHandler, FieldRegistry, FnHandler};

// Parsing and serialization
pub use supermodel_schema::{
    BaseLookup, DefaultPolicy, Parsed, Parser, PolicyRegistry, SchemaPolicy, Serializer,
    parse_model, serialize_model,
};

// Loading
pub use crate::error::LoadError;
pub use crate::loader::Loader;
pub use crate::{load_string, load_string_with, serialize_schema};
