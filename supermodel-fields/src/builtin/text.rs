//! Text field handler (`text`, `textline`, `password`).

use super::attrs::{AttrReader, check_bounds, reject_children, set_opt, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for free text fields with optional length bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextHandler;

impl FieldHandler for TextHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        reject_children(node, &[])?;
        let mut attrs = AttrReader::new(node);
        let element = attrs.element().to_string();
        let min_length: Option<usize> = attrs.parse("min_length")?;
        let max_length: Option<usize> = attrs.parse("max_length")?;
        check_bounds(&element, min_length, max_length)?;

        let field = attrs.into_field(FieldKind::Text {
            min_length,
            max_length,
        })?;

        if let Some(default) = &field.default {
            let len = default.chars().count();
            if min_length.is_some_and(|min| len < min) || max_length.is_some_and(|max| len > max) {
                return Err(ParseError::malformed(
                    element,
                    format!("default of {len} characters is outside the length bounds"),
                ));
            }
        }

        Ok(field)
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Text {
            min_length,
            max_length,
        } = &field.kind
        else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        set_opt(&mut node, "min_length", min_length.as_ref());
        set_opt(&mut node, "max_length", max_length.as_ref());
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(node: &XmlNode) -> Result<Field, ParseError> {
        TextHandler.read(node, &FieldRegistry::new())
    }

    #[test]
    fn test_read_text() {
        let node = XmlNode::new("textline")
            .with_attr("name", "title")
            .with_attr("required", "true")
            .with_attr("max_length", "80");

        let field = read(&node).expect("read");
        assert_eq!(field.type_tag, "textline");
        assert!(field.required);
        assert_eq!(
            field.kind,
            FieldKind::Text {
                min_length: None,
                max_length: Some(80)
            }
        );
    }

    #[test]
    fn test_read_rejects_non_numeric_bound() {
        let node = XmlNode::new("text")
            .with_attr("name", "title")
            .with_attr("max_length", "many");
        assert!(matches!(read(&node), Err(ParseError::MalformedField { .. })));
    }

    #[test]
    fn test_read_rejects_inverted_bounds() {
        let node = XmlNode::new("text")
            .with_attr("name", "title")
            .with_attr("min_length", "10")
            .with_attr("max_length", "2");
        assert!(read(&node).is_err());
    }

    #[test]
    fn test_read_rejects_long_default() {
        let node = XmlNode::new("text")
            .with_attr("name", "code")
            .with_attr("max_length", "2")
            .with_attr("default", "abc");
        assert!(read(&node).is_err());
    }

    #[test]
    fn test_read_rejects_children() {
        let node = XmlNode::new("text")
            .with_attr("name", "title")
            .with_child(XmlNode::new("value"));
        assert!(read(&node).is_err());
    }

    #[test]
    fn test_write_inverse_of_read() {
        let node = XmlNode::new("text")
            .with_attr("name", "body")
            .with_attr("title", "Body")
            .with_attr("description", "Main text")
            .with_attr("default", "hello")
            .with_attr("min_length", "1");

        let field = read(&node).expect("read");
        let written = TextHandler
            .write(&field, &FieldRegistry::new())
            .expect("write");
        assert_eq!(read(&written).expect("reread"), field);
    }

    #[test]
    fn test_write_kind_mismatch() {
        let field = Field::new("flag", "text", FieldKind::Bool);
        let err = TextHandler
            .write(&field, &FieldRegistry::new())
            .unwrap_err();
        assert!(matches!(err, SerializeError::KindMismatch { .. }));
    }
}
