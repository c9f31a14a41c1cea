//! Extension content carried through decode and encode without interpretation.
//!
//! Types declare open slots (`anyAttribute`, trailing `any`) for content whose
//! schema is unknown at build time. Such content is held here verbatim: foreign
//! attributes in a keyed map and foreign elements as owned element trees.

use crate::lexical::is_xml_whitespace;
use std::collections::BTreeMap;
use std::fmt;

/// Namespace-qualified XML name.
///
/// Ordering is by namespace first, then local name, which gives extension
/// attributes a stable iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Creates a name in the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Creates a name in no namespace.
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Returns the namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Attributes not bound to any declared field, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionAttributes {
    entries: BTreeMap<QName, String>,
}

impl ExtensionAttributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute, returning the previous value for that name.
    pub fn insert(&mut self, name: QName, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name, value.into())
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn get(&self, name: &QName) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Removes an attribute.
    pub fn remove(&mut self, name: &QName) -> Option<String> {
        self.entries.remove(name)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, name: &QName) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl<'a> IntoIterator for &'a ExtensionAttributes {
    type Item = (&'a QName, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, QName, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(QName, String)> for ExtensionAttributes {
    fn from_iter<I: IntoIterator<Item = (QName, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Child of an extension element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element.
    Element(ExtensionElement),
    /// Character data, unescaped.
    Text(String),
}

/// Opaque element captured from an open content slot.
///
/// The prefix is a serialization hint only and does not take part in
/// equality: two elements with the same qualified names, attributes and
/// children are equal regardless of how their namespaces were bound.
/// Children compare as a parser reads them back, with adjacent text nodes
/// merged and whitespace-only text ignored.
#[derive(Debug, Clone, Eq)]
pub struct ExtensionElement {
    /// Qualified element name.
    pub name: QName,
    /// Prefix the element was written with, if any.
    pub prefix: Option<String>,
    /// Attributes in document order.
    pub attributes: Vec<(QName, String)>,
    /// Children in document order.
    pub children: Vec<XmlNode>,
}

impl ExtensionElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            prefix: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the preferred prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: ExtensionElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends character data.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated character data of the direct children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Children with adjacent text merged and whitespace-only runs dropped.
    #[must_use]
    pub fn content(&self) -> Vec<Content<'_>> {
        fn flush(nodes: &mut Vec<Content<'_>>, text: &mut String) {
            if text.chars().all(is_xml_whitespace) {
                text.clear();
            } else {
                nodes.push(Content::Text(std::mem::take(text)));
            }
        }

        let mut nodes = Vec::with_capacity(self.children.len());
        let mut text = String::new();
        for child in &self.children {
            match child {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Element(e) => {
                    flush(&mut nodes, &mut text);
                    nodes.push(Content::Element(e));
                }
            }
        }
        flush(&mut nodes, &mut text);
        nodes
    }

    /// Iterates child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &ExtensionElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }
}

impl PartialEq for ExtensionElement {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.content() == other.content()
    }
}

/// Child of an extension element as a parser reads it back.
#[derive(Debug, PartialEq)]
pub enum Content<'a> {
    /// Nested element.
    Element(&'a ExtensionElement),
    /// Merged run of character data, never whitespace-only.
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREIGN_NS: &str = "http://example.com/ext";

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::new(FOREIGN_NS, "Note").to_string(), "{http://example.com/ext}Note");
        assert_eq!(QName::local("Status").to_string(), "Status");
    }

    #[test]
    fn test_extension_attributes_unique_keys() {
        let mut attrs = ExtensionAttributes::new();
        assert!(attrs.insert(QName::new(FOREIGN_NS, "a"), "1").is_none());
        assert_eq!(
            attrs.insert(QName::new(FOREIGN_NS, "a"), "2").as_deref(),
            Some("1")
        );
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get(&QName::new(FOREIGN_NS, "a")), Some("2"));
    }

    #[test]
    fn test_extension_attributes_iteration_order() {
        let attrs: ExtensionAttributes = [
            (QName::new("urn:b", "x"), "3".to_string()),
            (QName::local("z"), "1".to_string()),
            (QName::new("urn:a", "y"), "2".to_string()),
        ]
        .into_iter()
        .collect();

        let values: Vec<_> = attrs.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_element_equality_ignores_prefix() {
        let a = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_prefix("ext")
            .with_text("hello");
        let b = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_prefix("ns0")
            .with_text("hello");
        assert_eq!(a, b);

        let c = ExtensionElement::new(QName::new(FOREIGN_NS, "Note")).with_text("bye");
        assert_ne!(a, c);
    }

    #[test]
    fn test_element_equality_merges_text() {
        let item = || ExtensionElement::new(QName::new(FOREIGN_NS, "Item"));
        let split = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_text("a")
            .with_text("b")
            .with_text("  \n")
            .with_child(item())
            .with_text("");
        let merged = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_text("ab  \n")
            .with_child(item());
        assert_eq!(split, merged);
        assert_eq!(
            split.content(),
            vec![Content::Text("ab  \n".to_string()), Content::Element(&item())]
        );

        let blank = ExtensionElement::new(QName::new(FOREIGN_NS, "Note")).with_text(" \t");
        assert_eq!(blank, ExtensionElement::new(QName::new(FOREIGN_NS, "Note")));

        // Text on different sides of a child stays distinct.
        let before = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_text("a")
            .with_child(item());
        let after = ExtensionElement::new(QName::new(FOREIGN_NS, "Note"))
            .with_child(item())
            .with_text("a");
        assert_ne!(before, after);
    }

    #[test]
    fn test_element_accessors() {
        let element = ExtensionElement::new(QName::new(FOREIGN_NS, "Meta"))
            .with_attribute(QName::local("kind"), "audit")
            .with_text("a")
            .with_child(ExtensionElement::new(QName::new(FOREIGN_NS, "Item")))
            .with_text("b");

        assert_eq!(element.attribute(&QName::local("kind")), Some("audit"));
        assert_eq!(element.text(), "ab");
        assert_eq!(element.child_elements().count(), 1);
    }
}
