//! Schema document parser.
//!
//! This module turns a schema document into a [`SchemaModel`]: one
//! [`Schema`] per `<schema>` block, fields built through the field registry,
//! names, modules and bases decided by a [`SchemaPolicy`].

use crate::policy::{BaseLookup, DefaultPolicy, SchemaPolicy};
use crate::widgets::{WIDGETS_TAG, read_widgets};
use std::collections::BTreeMap;
use std::sync::Arc;
use supermodel_core::{ParseError, Schema, SchemaModel, WidgetWarning, XmlNode};
use supermodel_fields::FieldRegistry;

/// Tag of a schema block.
pub const SCHEMA_TAG: &str = "schema";

/// A successfully parsed document.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// The schema model.
    pub model: SchemaModel,
    /// Widget hints that were dropped, in document order.
    pub warnings: Vec<WidgetWarning>,
}

/// Parses schema documents with a given field registry and policy.
pub struct Parser<'a> {
    fields: &'a FieldRegistry,
    policy: &'a dyn SchemaPolicy,
    bases: Vec<Arc<Schema>>,
}

impl<'a> Parser<'a> {
    /// Creates a parser.
    ///
    /// # Arguments
    /// * `fields` - Registry used to read field elements
    /// * `policy` - Policy deciding names, modules and bases
    #[must_use]
    pub fn new(fields: &'a FieldRegistry, policy: &'a dyn SchemaPolicy) -> Self {
        Self {
            fields,
            policy,
            bases: Vec::new(),
        }
    }

    /// Makes already built schemata available as bases.
    ///
    /// Schemata from the document itself take precedence on a name clash.
    #[must_use]
    pub fn with_bases(mut self, bases: impl IntoIterator<Item = Arc<Schema>>) -> Self {
        self.bases.extend(bases);
        self
    }

    /// Parses a schema document.
    ///
    /// # Arguments
    /// * `xml` - Document text
    ///
    /// # Returns
    /// The model plus any widget warnings.
    ///
    /// # Errors
    /// Returns `ParseError` if the XML is malformed or any schema or field in
    /// it is invalid. Nothing is returned on failure.
    pub fn parse(&self, xml: &str) -> Result<Parsed, ParseError> {
        let root = XmlNode::parse_document(xml)?;
        self.parse_tree(&root)
    }

    /// Parses an already built document tree.
    ///
    /// A root that is itself a `<schema>` element is treated as the only
    /// block; otherwise every `<schema>` child of the root is a block.
    /// Prefixed namespace declarations on the root are in scope for every
    /// block.
    ///
    /// # Errors
    /// Returns `ParseError` if any schema or field is invalid.
    pub fn parse_tree(&self, root: &XmlNode) -> Result<Parsed, ParseError> {
        let mut parsed = Parsed::default();

        if root.local_name() == SCHEMA_TAG {
            self.parse_schema(root, &BTreeMap::new(), &mut parsed)?;
            return Ok(parsed);
        }

        let scope: BTreeMap<String, String> = root
            .namespace_declarations()
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect();

        for child in &root.children {
            if child.local_name() == SCHEMA_TAG {
                self.parse_schema(child, &scope, &mut parsed)?;
            } else {
                tracing::debug!("Skipping <{}> outside any schema block", child.name);
            }
        }

        Ok(parsed)
    }

    /// Parses one `<schema>` block into the model.
    fn parse_schema(
        &self,
        block: &XmlNode,
        scope: &BTreeMap<String, String>,
        parsed: &mut Parsed,
    ) -> Result<(), ParseError> {
        let declared = block.attr("name").unwrap_or_default();
        let name = self.policy.name(declared, block);
        if parsed.model.has_schema(&name) {
            return Err(ParseError::DuplicateSchema { name });
        }

        let mut schema = Schema::new(name.as_str());
        schema.module = self.policy.module(declared, block);
        schema.namespaces = scope.clone();
        for (prefix, uri) in block.namespace_declarations() {
            schema.namespaces.insert(prefix.to_string(), uri.to_string());
        }
        schema.bases = {
            let lookup = BaseLookup::new(&parsed.model, &self.bases);
            self.policy.bases(declared, block, &lookup)?
        };

        let mut widget_blocks = Vec::new();
        for child in &block.children {
            if child.local_name() == WIDGETS_TAG {
                widget_blocks.push(child);
                continue;
            }

            let field = self.fields.read_field(child)?;
            if field.name.is_empty() {
                return Err(ParseError::missing_attr(child.local_name(), "name"));
            }
            schema.add_field(field)?;
        }

        let hints = read_widgets(&schema, &widget_blocks, &mut parsed.warnings);
        tracing::debug!(
            "Parsed schema '{}' with {} fields and {} widget hints",
            name,
            schema.len(),
            hints.len()
        );

        parsed.model.insert_schema(Arc::new(schema))?;
        for (field, hint) in hints {
            parsed.model.set_widget(name.as_str(), field, hint);
        }

        Ok(())
    }
}

/// Parses a schema document with the built-in field handlers and the
/// default policy.
///
/// # Errors
/// Returns `ParseError` if the document is invalid.
pub fn parse_model(xml: &str) -> Result<SchemaModel, ParseError> {
    let fields = FieldRegistry::with_builtins();
    Parser::new(&fields, &DefaultPolicy)
        .parse(xml)
        .map(|parsed| parsed.model)
}
