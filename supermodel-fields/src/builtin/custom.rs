//! Verbatim handler for application-defined field tags.

use super::attrs::{AttrReader, COMMON_ATTRIBUTES, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use std::collections::BTreeMap;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler that keeps an element's extra attributes, children and text as
/// they are.
///
/// Register it under any tag the built-ins do not cover. The shared
/// attributes still go through the normal grammar; everything else lands in
/// [`FieldKind::Custom`], namespace declarations included, so prefixed
/// names inside the element stay bound on write.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomHandler;

impl FieldHandler for CustomHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        let mut attrs = AttrReader::new(node);
        let mut extra = BTreeMap::new();
        for (key, value) in &node.attributes {
            if COMMON_ATTRIBUTES.contains(&key.as_str()) {
                continue;
            }
            attrs.string(key);
            extra.insert(key.clone(), value.clone());
        }

        attrs.into_field(FieldKind::Custom {
            attributes: extra,
            children: node.children.clone(),
            text: node.text.clone(),
        })
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Custom {
            attributes,
            children,
            text,
        } = &field.kind
        else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        for (key, value) in attributes {
            node.set_attr(key.as_str(), value.as_str());
        }
        node.children = children.clone();
        node.text = text.clone();
        Ok(node)
    }
}
