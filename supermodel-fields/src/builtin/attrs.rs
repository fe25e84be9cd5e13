//! Attribute grammar shared by every built-in field element.

use std::fmt::Display;
use std::str::FromStr;
use supermodel_core::{Field, FieldKind, ParseError, XmlNode};

/// Attributes every built-in field element understands.
pub const COMMON_ATTRIBUTES: &[&str] = &[
    "name",
    "title",
    "description",
    "required",
    "readonly",
    "default",
];

/// Parses a boolean attribute value.
///
/// Accepts `true`/`false`/`1`/`0`, case-insensitive.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Reads attributes off a field element, tracking which ones were consumed.
///
/// [`into_field`](Self::into_field) rejects any attribute nobody asked for,
/// so a typo in a document fails loudly instead of vanishing on the next
/// serialize.
pub struct AttrReader<'a> {
    node: &'a XmlNode,
    element: String,
    consumed: Vec<&'a str>,
}

impl<'a> AttrReader<'a> {
    /// Starts reading the given element.
    #[must_use]
    pub fn new(node: &'a XmlNode) -> Self {
        let element = match node.attr("name") {
            Some(name) => format!("{} '{}'", node.local_name(), name),
            None => node.local_name().to_string(),
        };
        Self {
            node,
            element,
            consumed: Vec::new(),
        }
    }

    /// Element label used in error messages.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Returns an attribute value as-is.
    pub fn string(&mut self, key: &'a str) -> Option<String> {
        self.consumed.push(key);
        self.node.attr(key).map(str::to_string)
    }

    /// Returns an attribute that must be present and non-empty.
    ///
    /// # Errors
    /// Returns `ParseError::MalformedField` if the attribute is missing.
    pub fn require(&mut self, key: &'a str) -> Result<String, ParseError> {
        match self.string(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ParseError::missing_attr(self.element.clone(), key)),
        }
    }

    /// Parses an optional attribute.
    ///
    /// # Errors
    /// Returns `ParseError::MalformedField` if the value does not parse.
    pub fn parse<T: FromStr>(&mut self, key: &'a str) -> Result<Option<T>, ParseError> {
        self.consumed.push(key);
        match self.node.attr(key) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ParseError::invalid_attr(self.element.clone(), key, value)),
            None => Ok(None),
        }
    }

    /// Parses an optional boolean attribute, false when absent.
    ///
    /// # Errors
    /// Returns `ParseError::MalformedField` if the value is not a boolean.
    pub fn flag(&mut self, key: &'a str) -> Result<bool, ParseError> {
        self.consumed.push(key);
        match self.node.attr(key) {
            Some(value) => parse_bool(value)
                .ok_or_else(|| ParseError::invalid_attr(self.element.clone(), key, value)),
            None => Ok(false),
        }
    }

    /// Reads the shared attributes and builds the field.
    ///
    /// # Errors
    /// Returns `ParseError::MalformedField` if a shared attribute is invalid
    /// or the element carries an attribute that was never consumed.
    pub fn into_field(mut self, kind: FieldKind) -> Result<Field, ParseError> {
        let name = self.string("name").unwrap_or_default();
        let title = self.string("title");
        let description = self.string("description");
        let required = self.flag("required")?;
        let readonly = self.flag("readonly")?;
        let default = self.string("default");

        if let Some((key, _)) = self
            .node
            .attributes
            .iter()
            .find(|(k, _)| !k.starts_with("xmlns") && !self.consumed.contains(&k.as_str()))
        {
            return Err(ParseError::malformed(
                self.element,
                format!("unexpected attribute '{key}'"),
            ));
        }

        let mut field = Field::new(name, self.node.local_name(), kind);
        field.title = title;
        field.description = description;
        field.required = required;
        field.readonly = readonly;
        field.default = default;
        Ok(field)
    }
}

/// Rejects child elements other than the allowed ones.
///
/// # Errors
/// Returns `ParseError::MalformedField` naming the first unexpected child.
pub fn reject_children(node: &XmlNode, allowed: &[&str]) -> Result<(), ParseError> {
    match node
        .children
        .iter()
        .find(|c| !allowed.contains(&c.local_name()))
    {
        Some(child) => Err(ParseError::malformed(
            AttrReader::new(node).element(),
            format!("unexpected child element <{}>", child.name),
        )),
        None => Ok(()),
    }
}

/// Checks that a lower bound does not exceed an upper bound.
///
/// # Errors
/// Returns `ParseError::MalformedField` if `min > max`.
pub fn check_bounds<T: PartialOrd + Display>(
    element: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), ParseError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ParseError::malformed(
            element,
            format!("lower bound {min} exceeds upper bound {max}"),
        )),
        _ => Ok(()),
    }
}

/// Starts the element for a field, with the shared attributes set.
#[must_use]
pub fn write_common(field: &Field) -> XmlNode {
    let mut node = XmlNode::new(field.type_tag.as_str());
    if !field.name.is_empty() {
        node.set_attr("name", field.name.as_str());
    }
    set_opt(&mut node, "title", field.title.as_ref());
    set_opt(&mut node, "description", field.description.as_ref());
    if field.required {
        node.set_attr("required", "true");
    }
    if field.readonly {
        node.set_attr("readonly", "true");
    }
    set_opt(&mut node, "default", field.default.as_ref());
    node
}

/// Sets an attribute only when a value is present.
pub fn set_opt<T: Display>(node: &mut XmlNode, key: &str, value: Option<T>) {
    if let Some(value) = value {
        node.set_attr(key, value.to_string());
    }
}
