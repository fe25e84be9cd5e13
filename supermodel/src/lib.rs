//! # Supermodel
//!
//! Schema documents to in-memory schema models and back.
//!
//! A schema document is an XML file holding one or more `<schema>` blocks.
//! Each field element inside a block is read by the handler registered for
//! its tag; the resulting [`SchemaModel`] can be serialized back into an
//! equivalent document.
//!
//! ## Quick Start
//!
//! ```ignore
//! use supermodel::prelude::*;
//!
//! let model = load_string(xml, "")?;
//! let title = model.default_schema().and_then(|s| s.field("title"));
//!
//! let text = serialize_model(&model)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Node tree, model types, errors
//! - [`fields`] - Field codec registry and built-in handlers
//! - [`schema`] - Parser, serializer, schema policies
//! - [`loader`] - File loading with a per-path model cache

pub mod error;
pub mod loader;
pub mod prelude;

/// Node tree, model types and errors.
pub mod core {
    pub use supermodel_core::*;
}

/// Field codec registry and built-in handlers.
pub mod fields {
    pub use supermodel_fields::*;
}

/// Parser, serializer and schema policies.
pub mod schema {
    pub use supermodel_schema::*;
}

use std::sync::Arc;
use supermodel_fields::FieldRegistry;
use supermodel_schema::{Parser, PolicyRegistry};

// Re-export commonly used items at the crate root
pub use error::LoadError;
pub use loader::Loader;
pub use supermodel_core::{
    Field, FieldKind, ParseError, Schema, SchemaModel, SerializeError, WidgetHint,
};
pub use supermodel_schema::{parse_model, serialize_model};

/// Parses a document with the built-in field handlers and a policy from
/// a default [`PolicyRegistry`].
///
/// Only `""`, the default policy, is registered there; use
/// [`load_string_with`] to select application policies.
///
/// # Errors
/// Returns `ParseError::UnknownPolicy` for any other name, or any error the
/// parser reports.
pub fn load_string(xml: &str, policy: &str) -> Result<SchemaModel, ParseError> {
    load_string_with(xml, &PolicyRegistry::new(), policy)
}

/// Parses a document with the built-in field handlers and a named policy.
///
/// # Arguments
/// * `xml` - Document text
/// * `policies` - Registry the policy name is looked up in
/// * `policy` - Policy name; `""` selects the default policy
///
/// # Errors
/// Returns `ParseError::UnknownPolicy` for an unregistered name, or any
/// error the parser reports.
pub fn load_string_with(
    xml: &str,
    policies: &PolicyRegistry,
    policy: &str,
) -> Result<SchemaModel, ParseError> {
    let policy = policies.get(policy)?;
    let fields = FieldRegistry::with_builtins();
    Parser::new(&fields, policy.as_ref())
        .parse(xml)
        .map(|parsed| parsed.model)
}

/// Serializes one schema as a document holding only that schema.
///
/// # Arguments
/// * `schema` - The schema to write
/// * `name` - Name the schema is written under; `""` makes it the default
///   schema of the document
///
/// # Errors
/// Returns `SerializeError` if a field has no built-in handler.
pub fn serialize_schema(schema: Arc<Schema>, name: &str) -> Result<String, SerializeError> {
    serialize_model(&SchemaModel::single(schema, name))
}
