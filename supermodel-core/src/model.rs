//! Schema model definitions.
//!
//! This module contains the data structures produced by parsing a schema
//! document and consumed when serializing one: fields, schemata, widget
//! hints, and the [`SchemaModel`] that groups them.

use crate::error::ParseError;
use crate::node::XmlNode;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A single named, typed attribute of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, unique within the owning schema.
    pub name: String,
    /// Element tag that produced the field; selects its handler on write.
    pub type_tag: String,
    /// Human readable title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Whether the value may be changed after creation.
    pub readonly: bool,
    /// Default value in its textual form.
    pub default: Option<String>,
    /// Type-specific constraints.
    pub kind: FieldKind,
}

impl Field {
    /// Creates a field with no title, description or default.
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            title: None,
            description: None,
            required: false,
            readonly: false,
            default: None,
            kind,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field as required or optional.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Type-specific constraints of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text (`text`, `textline`, `password`).
    Text {
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Signed integer.
    Int {
        /// Inclusive lower bound.
        min: Option<i64>,
        /// Inclusive upper bound.
        max: Option<i64>,
    },
    /// Floating point number.
    Float {
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
    },
    /// Boolean flag.
    Bool,
    /// One value out of a fixed list or a named vocabulary.
    Choice {
        /// Enumerated values, in document order.
        values: Vec<String>,
        /// Name of an externally provided vocabulary.
        vocabulary: Option<String>,
    },
    /// Sequence of values (`list`, `set`, `tuple`).
    Collection {
        /// Type of the contained values.
        value_type: Option<Box<Field>>,
        /// Minimum number of items.
        min_length: Option<usize>,
        /// Maximum number of items.
        max_length: Option<usize>,
        /// Whether items must be distinct.
        unique: bool,
    },
    /// Value providing another schema, referenced by name.
    Object {
        /// Name of the nested schema.
        schema: String,
    },
    /// Application-defined field kept verbatim.
    Custom {
        /// All attributes except the shared ones.
        attributes: BTreeMap<String, String>,
        /// Child elements.
        children: Vec<XmlNode>,
        /// Text content.
        text: String,
    },
}

impl FieldKind {
    /// Returns a short name for the variant, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Bool => "bool",
            Self::Choice { .. } => "choice",
            Self::Collection { .. } => "collection",
            Self::Object { .. } => "object",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Named collection of fields, optionally extending other schemata.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Canonical name; empty for the default schema.
    pub name: String,
    /// Nominal module the schema belongs to. Metadata only.
    pub module: String,
    /// Base schemata, in declaration order.
    pub bases: Vec<Arc<Schema>>,
    /// Namespace prefixes in scope at the schema element, prefix to URI.
    ///
    /// Custom fields may carry prefixed names; these declarations are
    /// written back so the output stays namespace well-formed.
    pub namespaces: BTreeMap<String, String>,
    fields: Vec<Field>,
    field_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: String::new(),
            bases: Vec::new(),
            namespaces: BTreeMap::new(),
            fields: Vec::new(),
            field_map: HashMap::new(),
        }
    }

    /// Adds a field, keeping insertion order.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateField` if a field with the same name
    /// already exists.
    pub fn add_field(&mut self, field: Field) -> Result<(), ParseError> {
        if self.field_map.contains_key(&field.name) {
            return Err(ParseError::DuplicateField {
                schema: self.name.clone(),
                field: field.name,
            });
        }
        self.field_map.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Looks up a field declared directly on this schema.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&idx| &self.fields[idx])
    }

    /// Looks up a field on this schema, then on its bases depth-first.
    #[must_use]
    pub fn lookup_field(&self, name: &str) -> Option<&Field> {
        self.field(name)
            .or_else(|| self.bases.iter().find_map(|b| b.lookup_field(name)))
    }

    /// Returns true if the schema declares a field with the given name.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field_map.contains_key(name)
    }

    /// Fields declared on this schema, in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Names of the declared fields, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Names of the direct bases, in order.
    #[must_use]
    pub fn base_names(&self) -> Vec<&str> {
        self.bases.iter().map(|b| b.name.as_str()).collect()
    }

    /// Returns true if `name` is a direct or indirect base.
    #[must_use]
    pub fn extends(&self, name: &str) -> bool {
        self.bases
            .iter()
            .any(|b| b.name == name || b.extends(name))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Free-form rendering metadata for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetHint {
    params: BTreeMap<String, String>,
}

impl WidgetHint {
    /// Creates an empty hint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a hint parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a hint parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Iterates over parameters sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Widget hints of one schema, keyed by field name.
pub type SchemaWidgets = BTreeMap<String, WidgetHint>;

/// Result of parsing a schema document.
///
/// Schemata keep document order. Exactly one schema named `""` exists when
/// the document defines an unnamed block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    schemata: Vec<Arc<Schema>>,
    schema_map: HashMap<String, usize>,
    widgets: BTreeMap<String, SchemaWidgets>,
}

impl SchemaModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model holding one schema under `name` and no widgets.
    ///
    /// The schema is renamed if its own name differs.
    #[must_use]
    pub fn single(schema: Arc<Schema>, name: &str) -> Self {
        let schema = if schema.name == name {
            schema
        } else {
            let mut renamed = (*schema).clone();
            renamed.name = name.to_string();
            Arc::new(renamed)
        };
        let mut model = Self::new();
        model.schema_map.insert(name.to_string(), 0);
        model.schemata.push(schema);
        model
    }

    /// Adds a schema under its own name.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateSchema` if the name is taken.
    pub fn insert_schema(&mut self, schema: Arc<Schema>) -> Result<(), ParseError> {
        if self.schema_map.contains_key(&schema.name) {
            return Err(ParseError::DuplicateSchema {
                name: schema.name.clone(),
            });
        }
        self.schema_map
            .insert(schema.name.clone(), self.schemata.len());
        self.schemata.push(schema);
        Ok(())
    }

    /// Looks up a schema by name.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schema_map.get(name).map(|&idx| &self.schemata[idx])
    }

    /// Returns the unnamed schema, if the document defined one.
    #[must_use]
    pub fn default_schema(&self) -> Option<&Arc<Schema>> {
        self.schema("")
    }

    /// Returns true if a schema with the given name exists.
    #[must_use]
    pub fn has_schema(&self, name: &str) -> bool {
        self.schema_map.contains_key(name)
    }

    /// Iterates over schemata in insertion order.
    pub fn schemata(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemata.iter()
    }

    /// Schema names in insertion order.
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemata.iter().map(|s| s.name.as_str())
    }

    /// Number of schemata.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemata.len()
    }

    /// Returns true if the model holds no schemata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemata.is_empty()
    }

    /// All widget hints, keyed by schema name.
    #[must_use]
    pub fn widgets(&self) -> &BTreeMap<String, SchemaWidgets> {
        &self.widgets
    }

    /// Widget hints of one schema.
    #[must_use]
    pub fn widgets_for(&self, schema: &str) -> Option<&SchemaWidgets> {
        self.widgets.get(schema)
    }

    /// Widget hint of one field.
    #[must_use]
    pub fn widget(&self, schema: &str, field: &str) -> Option<&WidgetHint> {
        self.widgets.get(schema).and_then(|w| w.get(field))
    }

    /// Sets the widget hint of one field, replacing any previous hint.
    pub fn set_widget(
        &mut self,
        schema: impl Into<String>,
        field: impl Into<String>,
        hint: WidgetHint,
    ) {
        self.widgets
            .entry(schema.into())
            .or_default()
            .insert(field.into(), hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str) -> Field {
        Field::new(
            name,
            "text",
            FieldKind::Text {
                min_length: None,
                max_length: None,
            },
        )
    }

    #[test]
    fn test_schema_field_order() {
        let mut schema = Schema::new("Person");
        schema.add_field(text("name")).expect("add name");
        schema.add_field(text("email")).expect("add email");
        schema.add_field(text("bio")).expect("add bio");

        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["name", "email", "bio"]);
        assert_eq!(schema.len(), 3);
        assert!(schema.has_field("email"));
    }

    #[test]
    fn test_schema_duplicate_field() {
        let mut schema = Schema::new("Person");
        schema.add_field(text("name")).expect("add name");
        let err = schema.add_field(text("name")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateField { ref schema, ref field } if schema == "Person" && field == "name"
        ));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_lookup_field_through_bases() {
        let mut base = Schema::new("Base");
        base.add_field(text("id")).expect("add id");
        let base = Arc::new(base);

        let mut child = Schema::new("Child");
        child.bases.push(base.clone());
        child.add_field(text("label")).expect("add label");

        assert!(child.field("id").is_none());
        assert!(child.lookup_field("id").is_some());
        assert!(child.extends("Base"));
        assert!(!base.extends("Child"));
        assert_eq!(child.base_names(), vec!["Base"]);
    }

    #[test]
    fn test_model_duplicate_schema() {
        let mut model = SchemaModel::new();
        model.insert_schema(Arc::new(Schema::new(""))).expect("insert");
        let err = model.insert_schema(Arc::new(Schema::new(""))).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSchema { .. }));
        assert!(model.default_schema().is_some());
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_model_single_renames() {
        let schema = Arc::new(Schema::new("Original"));
        let model = SchemaModel::single(schema, "");
        assert_eq!(model.schema_names().collect::<Vec<_>>(), vec![""]);
        assert!(model.widgets().is_empty());
    }

    #[test]
    fn test_widgets() {
        let mut model = SchemaModel::new();
        model.set_widget("", "body", WidgetHint::new().with("type", "richtext"));

        let hint = model.widget("", "body").expect("hint");
        assert_eq!(hint.get("type"), Some("richtext"));
        assert!(model.widget("", "title").is_none());
        assert_eq!(model.widgets_for("").map(BTreeMap::len), Some(1));
    }
}
