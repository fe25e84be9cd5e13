//! Collection field handler (`list`, `set`, `tuple`).
//!
//! The item type is an ordinary field element wrapped in `<value_type>` and
//! dispatched through the registry:
//!
//! ```xml
//! <list name="tags" max_length="5" unique="true">
//!   <value_type><textline max_length="20"/></value_type>
//! </list>
//! ```

use super::attrs::{AttrReader, check_bounds, reject_children, set_opt, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for sequence fields with an optional item type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionHandler;

impl FieldHandler for CollectionHandler {
    fn read(&self, node: &XmlNode, registry: &FieldRegistry) -> Result<Field, ParseError> {
        reject_children(node, &["value_type"])?;
        let mut attrs = AttrReader::new(node);
        let element = attrs.element().to_string();
        let min_length: Option<usize> = attrs.parse("min_length")?;
        let max_length: Option<usize> = attrs.parse("max_length")?;
        let unique = attrs.flag("unique")?;
        check_bounds(&element, min_length, max_length)?;

        let mut wrappers = node.children_named("value_type");
        let value_type = match (wrappers.next(), wrappers.next()) {
            (None, _) => None,
            (Some(wrapper), None) => match wrapper.children.as_slice() {
                [inner] => Some(Box::new(registry.read_field(inner)?)),
                _ => {
                    return Err(ParseError::malformed(
                        element,
                        "<value_type> must hold exactly one field element",
                    ));
                }
            },
            (Some(_), Some(_)) => {
                return Err(ParseError::malformed(element, "more than one <value_type>"));
            }
        };

        attrs.into_field(FieldKind::Collection {
            value_type,
            min_length,
            max_length,
            unique,
        })
    }

    fn write(&self, field: &Field, registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Collection {
            value_type,
            min_length,
            max_length,
            unique,
        } = &field.kind
        else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        set_opt(&mut node, "min_length", min_length.as_ref());
        set_opt(&mut node, "max_length", max_length.as_ref());
        if *unique {
            node.set_attr("unique", "true");
        }
        if let Some(value_type) = value_type {
            let inner = registry.write_field(value_type)?;
            node.push_child(XmlNode::new("value_type").with_child(inner));
        }
        Ok(node)
    }
}
