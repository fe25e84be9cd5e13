//! Schema model serializer, the inverse of the parser.

use crate::parser::SCHEMA_TAG;
use crate::policy::BASES_ATTR;
use crate::widgets::write_widgets;
use supermodel_core::{Schema, SchemaModel, SchemaWidgets, SerializeError, XmlNode};
use supermodel_fields::FieldRegistry;

/// Namespace declared on the root element of serialized documents.
pub const SCHEMA_NAMESPACE: &str = "http://namespaces.supermodel.dev/schema";

/// Tag of the root element of serialized documents.
pub const MODEL_TAG: &str = "model";

/// Writes schema models back to documents.
///
/// Output is deterministic: schemata and fields keep model order, and
/// attributes follow [`ATTRIBUTE_ORDER`](supermodel_core::node::ATTRIBUTE_ORDER),
/// so structurally equal models serialize to identical text.
pub struct Serializer<'a> {
    fields: &'a FieldRegistry,
}

impl<'a> Serializer<'a> {
    /// Creates a serializer.
    ///
    /// # Arguments
    /// * `fields` - Registry used to write fields
    #[must_use]
    pub fn new(fields: &'a FieldRegistry) -> Self {
        Self { fields }
    }

    /// Serializes a model to document text.
    ///
    /// # Errors
    /// Returns `SerializeError` if any field has no handler or the handler
    /// rejects it. No partial document is produced.
    pub fn serialize(&self, model: &SchemaModel) -> Result<String, SerializeError> {
        self.to_tree(model)?.write_document()
    }

    /// Builds the document tree for a model without rendering it.
    ///
    /// # Errors
    /// Returns `SerializeError` if any field has no handler or the handler
    /// rejects it.
    pub fn to_tree(&self, model: &SchemaModel) -> Result<XmlNode, SerializeError> {
        let mut root = XmlNode::new(MODEL_TAG).with_attr("xmlns", SCHEMA_NAMESPACE);
        for schema in model.schemata() {
            let node = self.schema_node(schema, model.widgets_for(&schema.name))?;
            root.push_child(node);
        }
        Ok(root)
    }

    fn schema_node(
        &self,
        schema: &Schema,
        widgets: Option<&SchemaWidgets>,
    ) -> Result<XmlNode, SerializeError> {
        let mut node = XmlNode::new(SCHEMA_TAG);
        if !schema.name.is_empty() {
            node.set_attr("name", schema.name.as_str());
        }
        if !schema.bases.is_empty() {
            node.set_attr(BASES_ATTR, schema.base_names().join(" "));
        }
        for (prefix, uri) in &schema.namespaces {
            node.set_attr(format!("xmlns:{prefix}"), uri.as_str());
        }

        for field in schema.fields() {
            node.push_child(self.fields.write_field(field)?);
        }

        if let Some(block) = widgets.and_then(write_widgets) {
            node.push_child(block);
        }

        Ok(node)
    }
}

/// Serializes a model with the built-in field handlers.
///
/// # Errors
/// Returns `SerializeError` if a field has no built-in handler.
pub fn serialize_model(model: &SchemaModel) -> Result<String, SerializeError> {
    let fields = FieldRegistry::with_builtins();
    Serializer::new(&fields).serialize(model)
}
