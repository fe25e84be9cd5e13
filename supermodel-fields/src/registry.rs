//! Field codec registry routing element tags to handlers.

use crate::builtin::{
    BoolHandler, ChoiceHandler, CollectionHandler, FloatHandler, IntHandler, ObjectHandler,
    TextHandler,
};
use crate::handler::FieldHandler;
use std::collections::HashMap;
use std::sync::Arc;
use supermodel_core::{Field, ParseError, SerializeError, UnknownFieldType, XmlNode};

/// Tags served by the built-in handlers.
pub const BUILTIN_TAGS: &[&str] = &[
    "text", "textline", "password", "int", "float", "bool", "choice", "list", "set", "tuple",
    "object",
];

/// Maps field element tags to the handlers that read and write them.
///
/// Registration takes `&mut self` and is meant to happen once at startup;
/// lookups take `&self` and can run from any number of threads.
#[derive(Clone)]
pub struct FieldRegistry {
    handlers: HashMap<String, Arc<dyn FieldHandler>>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in handlers for [`BUILTIN_TAGS`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let text: Arc<dyn FieldHandler> = Arc::new(TextHandler);
        let collection: Arc<dyn FieldHandler> = Arc::new(CollectionHandler);
        for tag in ["text", "textline", "password"] {
            registry.register_shared(tag, text.clone());
        }
        for tag in ["list", "set", "tuple"] {
            registry.register_shared(tag, collection.clone());
        }
        registry.register("int", IntHandler);
        registry.register("float", FloatHandler);
        registry.register("bool", BoolHandler);
        registry.register("choice", ChoiceHandler);
        registry.register("object", ObjectHandler);
        registry
    }

    /// Registers a handler for a tag, replacing any previous binding.
    pub fn register<H: FieldHandler + 'static>(&mut self, tag: impl Into<String>, handler: H) {
        self.register_shared(tag, Arc::new(handler));
    }

    /// Registers an already shared handler for a tag, replacing any previous
    /// binding.
    ///
    /// A namespace prefix on `tag` is ignored, as in lookups.
    pub fn register_shared(&mut self, tag: impl Into<String>, handler: Arc<dyn FieldHandler>) {
        let tag = tag.into();
        let tag = local_tag(&tag).to_string();
        if self.handlers.insert(tag.clone(), handler).is_some() {
            tracing::debug!("Replaced field handler for <{}>", tag);
        }
    }

    /// Returns the handler for an element tag.
    ///
    /// A namespace prefix on `tag` is ignored.
    ///
    /// # Errors
    /// Returns `UnknownFieldType` if no handler is registered.
    pub fn handler_for_tag(&self, tag: &str) -> Result<&dyn FieldHandler, UnknownFieldType> {
        let local = local_tag(tag);
        self.handlers
            .get(local)
            .map(|h| h.as_ref())
            .ok_or_else(|| UnknownFieldType::new(local))
    }

    /// Returns the handler for a field, resolved by its type tag.
    ///
    /// # Errors
    /// Returns `UnknownFieldType` if no handler is registered.
    pub fn handler_for_field(&self, field: &Field) -> Result<&dyn FieldHandler, UnknownFieldType> {
        self.handler_for_tag(&field.type_tag)
    }

    /// Reads a field element through its handler.
    ///
    /// # Errors
    /// Returns `ParseError` if no handler is registered or the handler fails.
    pub fn read_field(&self, node: &XmlNode) -> Result<Field, ParseError> {
        self.handler_for_tag(node.local_name())?.read(node, self)
    }

    /// Writes a field through its handler.
    ///
    /// # Errors
    /// Returns `SerializeError` if no handler is registered or the handler fails.
    pub fn write_field(&self, field: &Field) -> Result<XmlNode, SerializeError> {
        self.handler_for_field(field)?.write(field, self)
    }

    /// Returns true if a handler is registered for the tag.
    ///
    /// A namespace prefix on `tag` is ignored.
    #[must_use]
    pub fn has_handler(&self, tag: &str) -> bool {
        self.handlers.contains_key(local_tag(tag))
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn local_tag(tag: &str) -> &str {
    tag.rsplit_once(':').map_or(tag, |(_, local)| local)
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::CustomHandler;
    use crate::handler::FnHandler;
    use supermodel_core::FieldKind;

    #[test]
    fn test_registry_new() {
        let registry = FieldRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.has_handler("text"));
    }

    #[test]
    fn test_registry_builtins() {
        let registry = FieldRegistry::with_builtins();
        assert_eq!(registry.len(), BUILTIN_TAGS.len());
        for tag in BUILTIN_TAGS {
            assert!(registry.has_handler(tag), "missing {tag}");
        }
        assert!(!registry.has_handler("richtext"));
    }

    #[test]
    fn test_handler_for_unknown_tag() {
        let registry = FieldRegistry::with_builtins();
        let err = registry.handler_for_tag("richtext").err().expect("should fail");
        assert_eq!(err.tag, "richtext");
    }

    #[test]
    fn test_handler_for_prefixed_tag() {
        let registry = FieldRegistry::with_builtins();
        assert!(registry.handler_for_tag("sm:text").is_ok());
    }

    #[test]
    fn test_handler_for_field_unknown() {
        let registry = FieldRegistry::with_builtins();
        let field = Field::new("x", "richtext", FieldKind::Bool);
        assert!(registry.handler_for_field(&field).is_err());
        assert!(matches!(
            registry.write_field(&field),
            Err(SerializeError::UnknownFieldType(_))
        ));
    }

    #[test]
    fn test_register_override_last_wins() {
        let mut registry = FieldRegistry::with_builtins();
        let before = registry.len();

        registry.register("text", CustomHandler);
        registry.register(
            "text",
            FnHandler::new(
                |node: &XmlNode, _: &FieldRegistry| {
                    Ok(Field::new(
                        node.attr("name").unwrap_or_default(),
                        "text",
                        FieldKind::Bool,
                    ))
                },
                |field: &Field, _: &FieldRegistry| Ok(XmlNode::new(field.type_tag.as_str())),
            ),
        );

        assert_eq!(registry.len(), before);
        let node = XmlNode::new("text").with_attr("name", "flag");
        let field = registry.read_field(&node).expect("read");
        assert_eq!(field.kind, FieldKind::Bool);
    }

    #[test]
    fn test_register_custom_tag() {
        let mut registry = FieldRegistry::new();
        registry.register("richtext", CustomHandler);

        let node = XmlNode::new("richtext")
            .with_attr("name", "body")
            .with_attr("format", "markdown");
        let field = registry.read_field(&node).expect("read");
        assert_eq!(field.type_tag, "richtext");

        let back = registry.write_field(&field).expect("write");
        assert_eq!(back, node);
    }

    #[test]
    fn test_tags_sorted() {
        let mut registry = FieldRegistry::new();
        registry.register("object", ObjectHandler);
        registry.register("bool", BoolHandler);
        assert_eq!(registry.tags(), vec!["bool", "object"]);
    }

    #[test]
    fn test_prefixed_tags_normalized() {
        let mut registry = FieldRegistry::with_builtins();
        assert!(registry.has_handler("sm:text"));
        assert!(registry.handler_for_tag("sm:text").is_ok());

        registry.register("ext:richtext", CustomHandler);
        assert!(registry.has_handler("richtext"));
        assert!(registry.has_handler("other:richtext"));
        assert!(registry.tags().contains(&"richtext"));

        let node = XmlNode::new("richtext").with_attr("name", "body");
        assert!(registry.read_field(&node).is_ok());
    }
}
