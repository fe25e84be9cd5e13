//! Generic XML node tree.
//!
//! Field handlers and schema policies never see the streaming reader; they
//! get a fully built [`XmlNode`]. The tree is read with `quick-xml` in one
//! pass and written back with a fixed attribute order so that equal trees
//! always produce identical text.

use crate::error::{ParseError, SerializeError};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Attributes written ahead of all others, in this order.
///
/// Any attribute not listed here is written after these, sorted by key.
pub const ATTRIBUTE_ORDER: &[&str] = &[
    "xmlns",
    "name",
    "field",
    "title",
    "description",
    "required",
    "readonly",
    "default",
    "bases",
];

/// Deepest element nesting accepted by [`XmlNode::parse_document`].
///
/// Trees are walked recursively, so depth is bounded at parse time.
pub const MAX_DEPTH: usize = 256;

/// An element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified tag name as written in the document.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Concatenated character data, trimmed.
    pub text: String,
}

impl XmlNode {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the tag without its namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Looks up an attribute value by key.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing any previous value for the key.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Builder form of [`push_child`](Self::push_child).
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Iterates over the prefixed namespace declarations on this element,
    /// as `(prefix, uri)` pairs.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(k, v)| {
            k.strip_prefix("xmlns:")
                .map(|prefix| (prefix, v.as_str()))
        })
    }

    /// Iterates over child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Returns the first child element with the given local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// Parses a complete document and returns its root element.
    ///
    /// # Errors
    /// Returns a syntax-class `ParseError` if the text is not well-formed XML,
    /// does not contain exactly one root element, or nests elements deeper
    /// than [`MAX_DEPTH`].
    pub fn parse_document(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(ParseError::document("nesting too deep"));
                    }
                    stack.push(Self::from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let node = Self::from_start(e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let mut node = stack
                        .pop()
                        .ok_or_else(|| ParseError::document("unexpected closing tag"))?;
                    let trimmed = node.text.trim();
                    if trimmed.len() != node.text.len() {
                        node.text = trimmed.to_string();
                    }
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(ref t)) => {
                    let raw = std::str::from_utf8(t.as_ref())?;
                    append_text(&mut stack, &unescape(raw)?)?;
                }
                Ok(Event::GeneralRef(ref r)) => {
                    let name = std::str::from_utf8(r.as_ref())?;
                    let resolved = unescape(&format!("&{name};"))?.into_owned();
                    append_text(&mut stack, &resolved)?;
                }
                Ok(Event::CData(ref c)) => {
                    let raw = std::str::from_utf8(c.as_ref())?;
                    append_text(&mut stack, raw)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::document(format!(
                "unclosed element '{}'",
                open.name
            )));
        }

        root.ok_or_else(|| ParseError::document("no root element"))
    }

    /// Writes this element as a complete document with an XML declaration.
    ///
    /// Attributes are emitted in [`ATTRIBUTE_ORDER`], then alphabetically.
    ///
    /// # Errors
    /// Returns `SerializeError` if the writer fails.
    pub fn write_document(&self) -> Result<String, SerializeError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_into(&mut writer)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), SerializeError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in self.ordered_attributes() {
            let value = escape_attr(value);
            start.push_attribute((key.as_bytes(), value.as_bytes()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if !self.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    fn ordered_attributes(&self) -> Vec<(&str, &str)> {
        let mut attrs: Vec<(&str, &str)> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        attrs.sort_by(|a, b| {
            attribute_rank(a.0)
                .cmp(&attribute_rank(b.0))
                .then_with(|| a.0.cmp(b.0))
        });
        attrs
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_string();
        let mut node = Self::new(name);

        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = std::str::from_utf8(&attr.value)?;
            node.attributes
                .push((key.to_string(), unescape(value)?.into_owned()));
        }

        Ok(node)
    }
}

fn attribute_rank(key: &str) -> usize {
    // Prefixed namespace declarations sort with the default one
    let key = if key.starts_with("xmlns:") { "xmlns" } else { key };
    ATTRIBUTE_ORDER
        .iter()
        .position(|k| *k == key)
        .unwrap_or(ATTRIBUTE_ORDER.len())
}

/// Escapes an attribute value, including the whitespace characters a
/// conforming reader would otherwise normalize to spaces.
fn escape_attr(value: &str) -> String {
    let escaped = escape(value);
    if !escaped.contains(['\t', '\r', '\n']) {
        return escaped.into_owned();
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Hands a finished element to its parent, or makes it the root.
fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::document(format!(
            "second root element '{}'",
            node.name
        )));
    }
    *root = Some(node);
    Ok(())
}

fn append_text(stack: &mut [XmlNode], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::document("text outside the root element")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let xml = r#"<?xml version="1.0"?>
<model xmlns:sm="urn:test">
    <schema name="A">
        <sm:text name="title" title="Fish &amp; Chips"/>
        <choice name="size">
            <value>small</value>
            <value>x &lt; y</value>
        </choice>
    </schema>
</model>"#;

        let root = XmlNode::parse_document(xml).expect("Failed to parse");
        assert_eq!(root.name, "model");
        assert_eq!(root.children.len(), 1);

        let schema = &root.children[0];
        assert_eq!(schema.attr("name"), Some("A"));
        assert!(schema.text.is_empty());

        let text = &schema.children[0];
        assert_eq!(text.name, "sm:text");
        assert_eq!(text.local_name(), "text");
        assert_eq!(text.attr("title"), Some("Fish & Chips"));

        let values: Vec<&str> = schema.children[1]
            .children_named("value")
            .map(|v| v.text.as_str())
            .collect();
        assert_eq!(values, vec!["small", "x < y"]);
    }

    #[test]
    fn test_parse_cdata() {
        let root = XmlNode::parse_document("<a><![CDATA[1 & 2]]></a>").expect("Failed to parse");
        assert_eq!(root.text, "1 & 2");
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let err = XmlNode::parse_document("<model><schema></model>").unwrap_err();
        assert!(err.is_syntax_error());
    }

    #[test]
    fn test_unclosed_root_rejected() {
        let err = XmlNode::parse_document("<model><schema/>").unwrap_err();
        assert!(err.is_syntax_error());
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = XmlNode::parse_document("  ").unwrap_err();
        assert!(matches!(err, ParseError::Document { .. }));
    }

    #[test]
    fn test_two_roots_rejected() {
        let err = XmlNode::parse_document("<a/><b/>").unwrap_err();
        assert!(matches!(err, ParseError::Document { .. }));
    }

    #[test]
    fn test_write_orders_attributes() {
        let node = XmlNode::new("int")
            .with_attr("max", "10")
            .with_attr("min", "1")
            .with_attr("required", "true")
            .with_attr("name", "age");

        let xml = node.write_document().expect("Failed to write");
        assert!(xml.contains(r#"<int name="age" required="true" max="10" min="1"/>"#));
    }

    #[test]
    fn test_write_escapes_and_reparses() {
        let node = XmlNode::new("choice")
            .with_attr("title", "a \"quoted\" <title>")
            .with_child(XmlNode::new("value").with_text("R&D"));

        let xml = node.write_document().expect("Failed to write");
        let back = XmlNode::parse_document(&xml).expect("Failed to parse");
        assert_eq!(back, node);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let depth = MAX_DEPTH + 1;
        let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let err = XmlNode::parse_document(&xml).unwrap_err();
        assert!(matches!(err, ParseError::Document { ref message } if message == "nesting too deep"));

        let xml = format!("<model>{}{}</model>", "<a>".repeat(200_000), "</a>".repeat(200_000));
        assert!(XmlNode::parse_document(&xml).unwrap_err().is_syntax_error());
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let xml = format!("{}{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        assert!(XmlNode::parse_document(&xml).is_ok());
    }

    #[test]
    fn test_write_escapes_attribute_whitespace() {
        let node = XmlNode::new("richtext").with_attr("template", "a\tb\r\nc & d");

        let xml = node.write_document().expect("Failed to write");
        assert!(xml.contains(r#"template="a&#9;b&#13;&#10;c &amp; d""#));
        let back = XmlNode::parse_document(&xml).expect("Failed to parse");
        assert_eq!(back, node);
    }

    #[test]
    fn test_namespace_declarations_written_first() {
        let node = XmlNode::new("model")
            .with_attr("name", "m")
            .with_attr("xmlns:f", "urn:f")
            .with_attr("xmlns", "urn:default");

        let xml = node.write_document().expect("Failed to write");
        assert!(xml.contains(r#"<model xmlns="urn:default" xmlns:f="urn:f" name="m"/>"#));
    }

    #[test]
    fn test_namespace_declarations() {
        let node = XmlNode::new("model")
            .with_attr("xmlns", "urn:default")
            .with_attr("xmlns:f", "urn:f")
            .with_attr("f:k", "v");

        let decls: Vec<(&str, &str)> = node.namespace_declarations().collect();
        assert_eq!(decls, vec![("f", "urn:f")]);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut node = XmlNode::new("text").with_attr("name", "a");
        node.set_attr("name", "b");
        assert_eq!(node.attributes.len(), 1);
        assert_eq!(node.attr("name"), Some("b"));
    }
}
