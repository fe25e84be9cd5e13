//! Field handler trait.

use crate::registry::FieldRegistry;
use supermodel_core::{Field, ParseError, SerializeError, XmlNode};

/// Converts between one kind of field element and its [`Field`] value.
///
/// Handlers are registered in a [`FieldRegistry`] under the element tags
/// they understand. Both operations are pure: they build values and touch
/// nothing else.
pub trait FieldHandler: Send + Sync {
    /// Builds a field from its element.
    ///
    /// # Arguments
    /// * `node` - The field element
    /// * `registry` - Registry used to read nested field elements
    ///
    /// # Errors
    /// Returns `ParseError::MalformedField` if required attributes are missing
    /// or have the wrong shape, or `ParseError::UnknownFieldType` if a nested
    /// element has no handler.
    fn read(&self, node: &XmlNode, registry: &FieldRegistry) -> Result<Field, ParseError>;

    /// Builds the element representing a field.
    ///
    /// # Arguments
    /// * `field` - The field to write
    /// * `registry` - Registry used to write nested fields
    ///
    /// # Errors
    /// Returns `SerializeError::KindMismatch` if the field kind is not one
    /// this handler writes.
    fn write(&self, field: &Field, registry: &FieldRegistry) -> Result<XmlNode, SerializeError>;
}

/// Handler built from a pair of functions.
pub struct FnHandler<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnHandler<R, W>
where
    R: Fn(&XmlNode, &FieldRegistry) -> Result<Field, ParseError> + Send + Sync,
    W: Fn(&Field, &FieldRegistry) -> Result<XmlNode, SerializeError> + Send + Sync,
{
    /// Creates a handler from read and write functions.
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> FieldHandler for FnHandler<R, W>
where
    R: Fn(&XmlNode, &FieldRegistry) -> Result<Field, ParseError> + Send + Sync,
    W: Fn(&Field, &FieldRegistry) -> Result<XmlNode, SerializeError> + Send + Sync,
{
    fn read(&self, node: &XmlNode, registry: &FieldRegistry) -> Result<Field, ParseError> {
        (self.read)(node, registry)
    }

    fn write(&self, field: &Field, registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        (self.write)(field, registry)
    }
}
