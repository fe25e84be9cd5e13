//! Error types for schema parsing and serialization.

use thiserror::Error;

/// No handler is registered for a field element tag.
///
/// Raised on both paths: when reading an element whose tag has no codec and
/// when writing a field whose recorded type tag has no codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no field handler registered for tag '{tag}'")]
pub struct UnknownFieldType {
    /// The unregistered tag.
    pub tag: String,
}

impl UnknownFieldType {
    /// Creates an unknown field type error for the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Error type for document parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML syntax error reported by the reader.
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Structurally invalid document (no root, unclosed elements, ...).
    #[error("malformed document: {message}")]
    Document {
        /// Error message.
        message: String,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Invalid character or entity reference.
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Field element tag has no registered handler.
    #[error(transparent)]
    UnknownFieldType(#[from] UnknownFieldType),

    /// Field element with missing or invalid attributes for its type.
    #[error("malformed field element '{element}': {reason}")]
    MalformedField {
        /// Element tag (and field name when known).
        element: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Schema block with invalid structure.
    #[error("malformed schema '{schema}': {reason}")]
    MalformedSchema {
        /// Schema name.
        schema: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two schema blocks resolved to the same name.
    #[error("duplicate schema definition: '{name}'")]
    DuplicateSchema {
        /// Name of the duplicate.
        name: String,
    },

    /// A field name was repeated inside one schema.
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField {
        /// Owning schema name.
        schema: String,
        /// Name of the duplicate field.
        field: String,
    },

    /// A declared base schema could not be found.
    #[error("schema '{schema}' extends unknown base '{base}'")]
    UnresolvedBase {
        /// Schema declaring the base.
        schema: String,
        /// Unresolved base name.
        base: String,
    },

    /// No policy registered under the requested name.
    #[error("no schema policy registered as '{name}'")]
    UnknownPolicy {
        /// Requested policy name.
        name: String,
    },
}

impl ParseError {
    /// Creates a document structure error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: &str) -> Self {
        Self::MalformedField {
            element: element.into(),
            reason: format!("missing required attribute '{attribute}'"),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(element: impl Into<String>, attribute: &str, value: &str) -> Self {
        Self::MalformedField {
            element: element.into(),
            reason: format!("invalid value '{value}' for attribute '{attribute}'"),
        }
    }

    /// Creates a malformed field error with a free-form reason.
    pub fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error stems from the XML text itself rather than
    /// from the schema it describes.
    #[must_use]
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::Xml(_) | Self::Document { .. } | Self::Utf8(_) | Self::Escape(_)
        )
    }
}

/// Error type for model serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Field type tag has no registered handler.
    #[error(transparent)]
    UnknownFieldType(#[from] UnknownFieldType),

    /// Handler was given a field whose kind it does not write.
    #[error("handler for '{tag}' cannot write field '{field}' of a different kind")]
    KindMismatch {
        /// Tag the handler was resolved for.
        tag: String,
        /// Field name.
        field: String,
    },

    /// XML writer error.
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error from the XML writer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced invalid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl SerializeError {
    /// Creates a kind mismatch error.
    pub fn kind_mismatch(tag: impl Into<String>, field: impl Into<String>) -> Self {
        Self::KindMismatch {
            tag: tag.into(),
            field: field.into(),
        }
    }
}

/// Non-fatal problem found in a `<widgets>` block.
///
/// The offending hint is dropped and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetWarning {
    /// Schema owning the widgets block.
    pub schema: String,
    /// What was ignored and why.
    pub reason: String,
}

impl WidgetWarning {
    /// Creates a widget warning.
    pub fn new(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for WidgetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema '{}': {}", self.schema, self.reason)
    }
}
