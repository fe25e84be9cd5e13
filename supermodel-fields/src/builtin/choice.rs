//! Choice field handler (`choice`).
//!
//! ```xml
//! <choice name="size" default="m">
//!   <value>s</value>
//!   <value>m</value>
//! </choice>
//! <choice name="country" vocabulary="countries"/>
//! ```

use super::attrs::{AttrReader, reject_children, set_opt, write_common};
use crate::handler::FieldHandler;
use crate::registry::FieldRegistry;
use supermodel_core::{Field, FieldKind, ParseError, SerializeError, XmlNode};

/// Handler for fields restricted to enumerated values or a named vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceHandler;

impl FieldHandler for ChoiceHandler {
    fn read(&self, node: &XmlNode, _registry: &FieldRegistry) -> Result<Field, ParseError> {
        reject_children(node, &["value"])?;
        let mut attrs = AttrReader::new(node);
        let element = attrs.element().to_string();
        let vocabulary = attrs.string("vocabulary");

        let mut values: Vec<String> = Vec::new();
        for value in node.children_named("value") {
            if values.contains(&value.text) {
                return Err(ParseError::malformed(
                    element,
                    format!("value '{}' listed twice", value.text),
                ));
            }
            values.push(value.text.clone());
        }

        if values.is_empty() && vocabulary.is_none() {
            return Err(ParseError::malformed(
                element,
                "needs <value> children or a 'vocabulary' attribute",
            ));
        }

        let field = attrs.into_field(FieldKind::Choice {
            values: values.clone(),
            vocabulary,
        })?;

        if let Some(default) = &field.default {
            if !values.is_empty() && !values.contains(default) {
                return Err(ParseError::malformed(
                    element,
                    format!("default '{default}' is not one of the values"),
                ));
            }
        }

        Ok(field)
    }

    fn write(&self, field: &Field, _registry: &FieldRegistry) -> Result<XmlNode, SerializeError> {
        let FieldKind::Choice { values, vocabulary } = &field.kind else {
            return Err(SerializeError::kind_mismatch(&field.type_tag, &field.name));
        };

        let mut node = write_common(field);
        set_opt(&mut node, "vocabulary", vocabulary.as_ref());
        for value in values {
            node.push_child(XmlNode::new("value").with_text(value.as_str()));
        }
        Ok(node)
    }
}
