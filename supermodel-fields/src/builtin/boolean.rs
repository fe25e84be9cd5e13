//! Boolean field handler (`bool`).

use super::attrs::{AttrReader, parse_bool, reject_children, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for yes/no fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolHandler;

impl FieldHandler for BoolHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        reject_children(node, &[])?;
        let attrs = AttrReader::new(node);
        let element = attrs.element().to_string();
        let field = attrs.into_field(FieldKind::Bool)?;

        if let Some(default) = &field.default {
            if parse_bool(default).is_none() {
                return Err(ParseError::invalid_attr(element, "default", default));
            }
        }

        Ok(field)
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        match field.kind {
            FieldKind::Bool => Ok(write_common(field)),
            _ => Err(SerializeError::kind_mismatch(&field.type_tag, &field.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bool() {
        let node = XmlNode::new("bool")
            .with_attr("name", "published")
            .with_attr("default", "false");

        let field = BoolHandler.read(&node, &FieldRegistry::new()).expect("read");
        assert_eq!(field.kind, FieldKind::Bool);
        assert_eq!(field.default.as_deref(), Some("false"));
    }

    #[test]
    fn test_read_bool_rejects_bad_default() {
        let node = XmlNode::new("bool")
            .with_attr("name", "published")
            .with_attr("default", "perhaps");
        assert!(BoolHandler.read(&node, &FieldRegistry::new()).is_err());
    }

    #[test]
    fn test_read_bool_rejects_constraints() {
        let node = XmlNode::new("bool")
            .with_attr("name", "published")
            .with_attr("max", "1");
        assert!(BoolHandler.read(&node, &FieldRegistry::new()).is_err());
    }
}
