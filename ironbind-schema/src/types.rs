//! Schema type definitions.
//!
//! This module contains the data structures describing a binding schema:
//! complex types, their fields, open content wildcards and root elements.

use ironbind_core::{IntegerFacets, Occurs, SignConstraint, WhiteSpace};
use std::collections::HashMap;
use std::fmt;

/// Complete binding schema.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Schema name.
    pub name: String,
    /// Schema version label.
    pub version: Option<String>,
    /// Target namespace of typed elements.
    pub target_namespace: Option<String>,
    /// Prefix to bind the target namespace to when it cannot be the default.
    pub prefix: Option<String>,
    /// Whether local elements are namespace-qualified.
    pub element_form: Form,
    /// Schema description.
    pub description: Option<String>,
    /// Complex type definitions.
    pub types: Vec<ComplexTypeDef>,
    /// Global elements that may appear as document roots.
    pub roots: Vec<RootElement>,
    /// Type lookup map (built while adding types).
    type_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            target_namespace: None,
            prefix: None,
            element_form: Form::Qualified,
            description: None,
            types: Vec::new(),
            roots: Vec::new(),
            type_map: HashMap::new(),
        }
    }

    /// Sets the target namespace.
    #[must_use]
    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }

    /// Sets the local element form.
    #[must_use]
    pub fn with_element_form(mut self, form: Form) -> Self {
        self.element_form = form;
        self
    }

    /// Adds a type and returns the schema.
    #[must_use]
    pub fn with_type(mut self, type_def: ComplexTypeDef) -> Self {
        self.add_type(type_def);
        self
    }

    /// Adds a root element and returns the schema.
    #[must_use]
    pub fn with_root(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.add_root(RootElement::new(name, type_name));
        self
    }

    /// Adds a type definition to the schema.
    pub fn add_type(&mut self, type_def: ComplexTypeDef) {
        let name = type_def.name.clone();
        let index = self.types.len();
        self.types.push(type_def);
        self.type_map.entry(name).or_insert(index);
    }

    /// Adds a root element declaration.
    pub fn add_root(&mut self, root: RootElement) {
        self.roots.push(root);
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&ComplexTypeDef> {
        self.type_map.get(name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }

    /// Looks up a root element by name.
    #[must_use]
    pub fn get_root(&self, name: &str) -> Option<&RootElement> {
        self.roots.iter().find(|r| r.name == name)
    }

    /// Builds the type lookup map from the types vector.
    pub fn build_type_map(&mut self) {
        self.type_map.clear();
        for (idx, type_def) in self.types.iter().enumerate() {
            self.type_map.entry(type_def.name.clone()).or_insert(idx);
        }
    }

    /// Namespace expected on local (non-root) typed elements.
    #[must_use]
    pub fn local_element_namespace(&self) -> Option<&str> {
        match self.element_form {
            Form::Qualified => self.target_namespace.as_deref(),
            Form::Unqualified => None,
        }
    }
}

/// Namespace qualification of local elements (`elementFormDefault`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Form {
    /// Local elements are in the target namespace.
    #[default]
    Qualified,
    /// Local elements are in no namespace.
    Unqualified,
}

impl Form {
    /// Parses a form from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

/// Global element that may be a document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    /// Element local name.
    pub name: String,
    /// Complex type of the element.
    pub type_name: String,
}

impl RootElement {
    /// Creates a root element declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Complex type definition.
#[derive(Debug, Clone)]
pub struct ComplexTypeDef {
    /// Type name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
    /// Open attribute slot (`anyAttribute`).
    pub any_attribute: Option<Wildcard>,
    /// Trailing open element slot (`any`).
    pub any_element: Option<Wildcard>,
    /// Description.
    pub description: Option<String>,
}

impl ComplexTypeDef {
    /// Creates a new type with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            any_attribute: None,
            any_element: None,
            description: None,
        }
    }

    /// Appends a field and returns the type.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.add_field(field);
        self
    }

    /// Sets the attribute wildcard.
    #[must_use]
    pub fn with_any_attribute(mut self, wildcard: Wildcard) -> Self {
        self.any_attribute = Some(wildcard);
        self
    }

    /// Sets the trailing element wildcard.
    #[must_use]
    pub fn with_any_element(mut self, wildcard: Wildcard) -> Self {
        self.any_element = Some(wildcard);
        self
    }

    /// Appends a field.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields.push(field);
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterates attribute fields in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.node == NodeKind::Attribute)
    }

    /// Iterates element fields in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.node == NodeKind::Element)
    }

    /// Returns the character data field of a simple-content type.
    #[must_use]
    pub fn text_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.node == NodeKind::Text)
    }

    /// Returns true if the type carries character data instead of elements.
    #[must_use]
    pub fn has_simple_content(&self) -> bool {
        self.text_field().is_some()
    }
}

/// Where a field lives in the XML representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Attribute of the owning element.
    Attribute,
    /// Child element.
    Element,
    /// Character data of the owning element.
    Text,
}

/// Field definition within a complex type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// XML name (attribute or element local name).
    pub name: String,
    /// Node the field maps to.
    pub node: NodeKind,
    /// Value kind.
    pub kind: FieldKind,
    /// Occurrence range.
    pub occurs: Occurs,
    /// Permitted values, compared on the canonical lexical form.
    pub enumeration: Option<Vec<String>>,
    /// Whitespace facet applied to text values.
    pub white_space: WhiteSpace,
    /// Description.
    pub description: Option<String>,
}

impl FieldDef {
    fn new(name: String, node: NodeKind, kind: FieldKind, occurs: Occurs) -> Self {
        Self {
            name,
            node,
            kind,
            occurs,
            enumeration: None,
            white_space: WhiteSpace::Preserve,
            description: None,
        }
    }

    /// Creates a required element field.
    #[must_use]
    pub fn element(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name.into(), NodeKind::Element, kind, Occurs::REQUIRED)
    }

    /// Creates an optional attribute field.
    #[must_use]
    pub fn attribute(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name.into(), NodeKind::Attribute, kind, Occurs::OPTIONAL)
    }

    /// Creates the character data field of a simple-content type.
    #[must_use]
    pub fn text(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name.into(), NodeKind::Text, kind, Occurs::OPTIONAL)
    }

    /// Sets the occurrence range.
    #[must_use]
    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Marks the field required (exactly one occurrence).
    #[must_use]
    pub fn required(self) -> Self {
        self.occurs(Occurs::REQUIRED)
    }

    /// Marks the field optional (zero or one occurrence).
    #[must_use]
    pub fn optional(self) -> Self {
        self.occurs(Occurs::OPTIONAL)
    }

    /// Restricts the field to an enumeration.
    #[must_use]
    pub fn with_enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the whitespace facet.
    #[must_use]
    pub fn with_white_space(mut self, white_space: WhiteSpace) -> Self {
        self.white_space = white_space;
        self
    }

    /// Returns true if at least one occurrence is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.occurs.is_required()
    }

    /// Returns true if the field may occur more than once.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.occurs.is_repeated()
    }

    /// Path segment naming this field in error messages.
    #[must_use]
    pub fn path_segment(&self) -> String {
        match self.node {
            NodeKind::Attribute => format!("@{}", self.name),
            NodeKind::Element => self.name.clone(),
            NodeKind::Text => "#text".to_string(),
        }
    }
}

/// Value kind of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Character data.
    Text,
    /// Integer with optional digit ceiling and sign restriction.
    Integer(IntegerFacets),
    /// `xs:boolean`.
    Boolean,
    /// Nested complex type, by name.
    Nested(String),
    /// Whitespace separated list (`xs:list`) of simple items.
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Creates an integer kind.
    #[must_use]
    pub const fn integer(total_digits: Option<u32>, sign: SignConstraint) -> Self {
        Self::Integer(IntegerFacets::new(total_digits, sign))
    }

    /// Creates a nested kind.
    #[must_use]
    pub fn nested(type_name: impl Into<String>) -> Self {
        Self::Nested(type_name.into())
    }

    /// Creates a list kind.
    #[must_use]
    pub fn list(item: FieldKind) -> Self {
        Self::List(Box::new(item))
    }

    /// Returns true if values of this kind are written as character data.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        !matches!(self, Self::Nested(_))
    }

    /// Resolves a built-in XML Schema type name to a kind and its default
    /// whitespace facet.
    #[must_use]
    pub fn builtin(type_name: &str) -> Option<(Self, WhiteSpace)> {
        let local = type_name.rsplit(':').next().unwrap_or(type_name);
        match local {
            "string" => Some((Self::Text, WhiteSpace::Preserve)),
            "normalizedString" => Some((Self::Text, WhiteSpace::Replace)),
            "token" => Some((Self::Text, WhiteSpace::Collapse)),
            "integer" | "int" | "long" => {
                Some((Self::integer(None, SignConstraint::None), WhiteSpace::Collapse))
            }
            "nonNegativeInteger" => Some((
                Self::integer(None, SignConstraint::NonNegative),
                WhiteSpace::Collapse,
            )),
            "positiveInteger" => Some((
                Self::integer(None, SignConstraint::Positive),
                WhiteSpace::Collapse,
            )),
            "boolean" => Some((Self::Boolean, WhiteSpace::Collapse)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer(_) => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Nested(name) => write!(f, "record of type '{name}'"),
            Self::List(item) => write!(f, "list of {item}"),
        }
    }
}

/// Open content slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    /// Namespaces admitted by the slot.
    pub namespace: NamespaceConstraint,
    /// How admitted content is processed.
    pub process_contents: ProcessContents,
    /// Occurrence range (element wildcards only).
    pub occurs: Occurs,
}

impl Wildcard {
    /// Creates a lax wildcard admitting the given namespaces any number of times.
    #[must_use]
    pub fn lax(namespace: NamespaceConstraint) -> Self {
        Self {
            namespace,
            process_contents: ProcessContents::Lax,
            occurs: Occurs::ANY,
        }
    }

    /// Returns true if content in `namespace` may fill this slot.
    #[must_use]
    pub fn admits(&self, namespace: Option<&str>, target_namespace: Option<&str>) -> bool {
        self.namespace.admits(namespace, target_namespace)
    }
}

/// Namespace constraint of a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `##any`.
    Any,
    /// `##other`: qualified names outside the target namespace.
    Other,
    /// Explicit list of namespaces.
    List(Vec<NamespaceToken>),
}

impl NamespaceConstraint {
    /// Parses the `namespace` attribute of a wildcard.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "##any" => Some(Self::Any),
            "##other" => Some(Self::Other),
            list => list
                .split_ascii_whitespace()
                .map(NamespaceToken::parse)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
        }
    }

    /// Returns true if `namespace` is admitted.
    #[must_use]
    pub fn admits(&self, namespace: Option<&str>, target_namespace: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Other => namespace.is_some() && namespace != target_namespace,
            Self::List(tokens) => tokens.iter().any(|t| match t {
                NamespaceToken::TargetNamespace => {
                    namespace.is_some() && namespace == target_namespace
                }
                NamespaceToken::Local => namespace.is_none(),
                NamespaceToken::Uri(uri) => namespace == Some(uri.as_str()),
            }),
        }
    }
}

/// Entry of an explicit wildcard namespace list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceToken {
    /// `##targetNamespace`.
    TargetNamespace,
    /// `##local`: names in no namespace.
    Local,
    /// A namespace URI.
    Uri(String),
}

impl NamespaceToken {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "##targetNamespace" => Some(Self::TargetNamespace),
            "##local" => Some(Self::Local),
            other if other.starts_with("##") => None,
            uri => Some(Self::Uri(uri.to_string())),
        }
    }
}

/// Processing mode of wildcard content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessContents {
    /// Content must be valid against a known declaration.
    Strict,
    /// Content is validated when a declaration is known.
    #[default]
    Lax,
    /// Content is not validated.
    Skip,
}

impl ProcessContents {
    /// Parses a processing mode from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironbind_core::MaxOccurs;

    const EBICS_NS: &str = "urn:org:ebics:H004";

    #[test]
    fn test_schema_type_lookup() {
        let schema = Schema::new("test")
            .with_type(ComplexTypeDef::new("PartnerInfoType"))
            .with_root("PartnerInfo", "PartnerInfoType");

        assert!(schema.has_type("PartnerInfoType"));
        assert!(!schema.has_type("unknown"));
        assert_eq!(
            schema.get_root("PartnerInfo").map(|r| r.type_name.as_str()),
            Some("PartnerInfoType")
        );
    }

    #[test]
    fn test_schema_build_type_map() {
        let mut schema = Schema::new("test");
        schema.types.push(ComplexTypeDef::new("A"));
        schema.types.push(ComplexTypeDef::new("B"));

        schema.build_type_map();

        assert!(schema.has_type("A"));
        assert!(schema.has_type("B"));
    }

    #[test]
    fn test_local_element_namespace() {
        let schema = Schema::new("test").with_target_namespace(EBICS_NS);
        assert_eq!(schema.local_element_namespace(), Some(EBICS_NS));

        let schema = schema.with_element_form(Form::Unqualified);
        assert_eq!(schema.local_element_namespace(), None);
    }

    #[test]
    fn test_complex_type_field_views() {
        let user_id = ComplexTypeDef::new("UserIDType")
            .with_field(FieldDef::text("value", FieldKind::Text))
            .with_field(FieldDef::attribute("Status", FieldKind::integer(None, SignConstraint::None)).required());

        assert!(user_id.has_simple_content());
        assert_eq!(user_id.attributes().count(), 1);
        assert_eq!(user_id.elements().count(), 0);
        assert!(user_id.field("Status").is_some_and(FieldDef::is_required));
    }

    #[test]
    fn test_field_def_builders() {
        let permission = FieldDef::element("Permission", FieldKind::nested("UserPermissionType"))
            .occurs(Occurs::new(1, MaxOccurs::Unbounded));
        assert!(permission.is_required());
        assert!(permission.is_repeated());
        assert_eq!(permission.path_segment(), "Permission");

        let limit = FieldDef::attribute("fetchLimit", FieldKind::integer(Some(10), SignConstraint::NonNegative));
        assert!(!limit.is_required());
        assert_eq!(limit.path_segment(), "@fetchLimit");
    }

    #[test]
    fn test_builtin_kinds() {
        assert_eq!(FieldKind::builtin("string"), Some((FieldKind::Text, WhiteSpace::Preserve)));
        assert_eq!(FieldKind::builtin("xs:token"), Some((FieldKind::Text, WhiteSpace::Collapse)));
        assert_eq!(
            FieldKind::builtin("nonNegativeInteger").map(|(k, _)| k),
            Some(FieldKind::integer(None, SignConstraint::NonNegative))
        );
        assert_eq!(FieldKind::builtin("PartnerInfoType"), None);
    }

    #[test]
    fn test_namespace_constraint_parse() {
        assert_eq!(NamespaceConstraint::parse("##any"), Some(NamespaceConstraint::Any));
        assert_eq!(NamespaceConstraint::parse("##other"), Some(NamespaceConstraint::Other));
        assert_eq!(
            NamespaceConstraint::parse("##targetNamespace urn:x"),
            Some(NamespaceConstraint::List(vec![
                NamespaceToken::TargetNamespace,
                NamespaceToken::Uri("urn:x".to_string()),
            ]))
        );
        assert_eq!(NamespaceConstraint::parse("##bogus"), None);
    }

    #[test]
    fn test_namespace_constraint_admits() {
        let target = Some(EBICS_NS);
        assert!(NamespaceConstraint::Other.admits(Some("urn:foreign"), target));
        assert!(!NamespaceConstraint::Other.admits(Some(EBICS_NS), target));
        assert!(!NamespaceConstraint::Other.admits(None, target));
        assert!(NamespaceConstraint::Any.admits(None, target));

        let list = NamespaceConstraint::List(vec![
            NamespaceToken::TargetNamespace,
            NamespaceToken::Local,
        ]);
        assert!(list.admits(Some(EBICS_NS), target));
        assert!(list.admits(None, target));
        assert!(!list.admits(Some("urn:foreign"), target));
    }

    #[test]
    fn test_process_contents_parse() {
        assert_eq!(ProcessContents::parse("lax"), Some(ProcessContents::Lax));
        assert_eq!(ProcessContents::parse("skip"), Some(ProcessContents::Skip));
        assert_eq!(ProcessContents::parse("loose"), None);
    }
}
