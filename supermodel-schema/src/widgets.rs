//! Widget hint blocks.
//!
//! ```xml
//! <widgets>
//!   <widget field="body" type="richtext" rows="10"/>
//! </widgets>
//! ```
//!
//! Widget data is advisory. These shapes are ignored with a
//! [`WidgetWarning`] instead of failing the parse:
//! - a child of `<widgets>` that is not `<widget>`
//! - a `<widget>` without a `field` attribute
//! - a `<widget>` naming a field the schema (or its bases) does not have
//! - a second `<widget>` for the same field (the first one is kept)
//! - a second `<widgets>` block in the same schema
//! - child elements or text inside a `<widget>` (the attributes are kept)

use supermodel_core::{Schema, SchemaWidgets, WidgetHint, WidgetWarning, XmlNode};

/// Tag of the block holding a schema's widget hints.
pub const WIDGETS_TAG: &str = "widgets";

/// Tag of one widget hint.
pub const WIDGET_TAG: &str = "widget";

/// Attribute naming the field a hint belongs to.
pub const FIELD_ATTR: &str = "field";

/// Collects widget hints for a parsed schema.
///
/// Problems are appended to `warnings` and logged; they never fail.
pub fn read_widgets(
    schema: &Schema,
    blocks: &[&XmlNode],
    warnings: &mut Vec<WidgetWarning>,
) -> SchemaWidgets {
    let mut hints = SchemaWidgets::new();

    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            warn(warnings, schema, "second <widgets> block ignored".to_string());
            continue;
        }

        for entry in &block.children {
            if entry.local_name() != WIDGET_TAG {
                warn(
                    warnings,
                    schema,
                    format!("unexpected element <{}> in <widgets>", entry.name),
                );
                continue;
            }

            let Some(field) = entry.attr(FIELD_ATTR) else {
                warn(
                    warnings,
                    schema,
                    "<widget> without a 'field' attribute".to_string(),
                );
                continue;
            };

            if schema.lookup_field(field).is_none() {
                warn(
                    warnings,
                    schema,
                    format!("<widget> for unknown field '{field}'"),
                );
                continue;
            }

            if hints.contains_key(field) {
                warn(
                    warnings,
                    schema,
                    format!("repeated <widget> for field '{field}'"),
                );
                continue;
            }

            if !entry.children.is_empty() || !entry.text.is_empty() {
                warn(
                    warnings,
                    schema,
                    format!("content of <widget> for field '{field}' ignored"),
                );
            }

            let mut hint = WidgetHint::new();
            for (key, value) in &entry.attributes {
                if key != FIELD_ATTR && !key.starts_with("xmlns") {
                    hint.insert(key.as_str(), value.as_str());
                }
            }
            hints.insert(field.to_string(), hint);
        }
    }

    hints
}

/// Builds the `<widgets>` block for a schema, or `None` when it has no hints.
///
/// A hint parameter named `field` cannot be represented and is skipped.
#[must_use]
pub fn write_widgets(widgets: &SchemaWidgets) -> Option<XmlNode> {
    if widgets.is_empty() {
        return None;
    }

    let mut block = XmlNode::new(WIDGETS_TAG);
    for (field, hint) in widgets {
        let mut node = XmlNode::new(WIDGET_TAG).with_attr(FIELD_ATTR, field.as_str());
        for (key, value) in hint.iter().filter(|(k, _)| *k != FIELD_ATTR) {
            node.set_attr(key, value);
        }
        block.push_child(node);
    }
    Some(block)
}

fn warn(warnings: &mut Vec<WidgetWarning>, schema: &Schema, reason: String) {
    tracing::warn!("Ignoring widget hint in schema '{}': {}", schema.name, reason);
    warnings.push(WidgetWarning::new(schema.name.as_str(), reason));
}
