//! Object field handler (`object`).

use super::attrs::{AttrReader, reject_children, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for fields whose value provides another schema.
///
/// The nested schema is referenced by name through the required `schema`
/// attribute; resolving it is left to whoever materializes the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectHandler;

impl FieldHandler for ObjectHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        reject_children(node, &[])?;
        let mut attrs = AttrReader::new(node);
        let schema = attrs.require("schema")?;
        attrs.into_field(FieldKind::Object { schema })
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Object { schema } = &field.kind else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        node.set_attr("schema", schema.as_str());
        Ok(node)
    }
}
