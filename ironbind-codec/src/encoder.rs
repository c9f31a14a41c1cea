//! Document encoder.
//!
//! Fields are written once, in declared order: attributes, then either the
//! character data of a simple-content type or the element sequence followed
//! by extension elements. Namespace declarations for extension content are
//! synthesized on the element that first needs them.

use crate::config::CodecConfig;
use crate::error::EncodeError;
use crate::scalar::format_value;
use crate::validator::validate_record;
use ironbind_core::{Content, Document, ExtensionElement, FieldValue, QName, Record, ValidationError};
use ironbind_schema::{ComplexTypeDef, FieldDef, FieldKind, Form, Schema};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Namespace bound to the `xml` prefix in every document.
pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix used for the target namespace of unqualified schemas without one.
const DEFAULT_ROOT_PREFIX: &str = "tns";

/// Namespace bindings in scope while writing, innermost frame last.
///
/// The default namespace is stored under the empty prefix; an empty URI
/// records an `xmlns=""` undeclaration.
#[derive(Debug)]
struct Scopes {
    frames: Vec<Vec<(String, String)>>,
}

impl Scopes {
    fn new() -> Self {
        Self {
            frames: vec![vec![("xml".to_string(), XML_NAMESPACE.to_string())]],
        }
    }

    fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, prefix: &str, uri: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push((prefix.to_string(), uri.to_string()));
        }
    }

    fn bindings(&self) -> impl Iterator<Item = &(String, String)> {
        self.frames.iter().rev().flat_map(|frame| frame.iter().rev())
    }

    /// URI bound to `prefix`, innermost binding first.
    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.bindings()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn default_namespace(&self) -> Option<&str> {
        self.lookup("").filter(|uri| !uri.is_empty())
    }

    /// A non-default prefix currently bound to `uri`.
    fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings()
            .filter(|(p, u)| !p.is_empty() && u == uri)
            .map(|(p, _)| p.as_str())
            .find(|p| self.lookup(p) == Some(uri))
    }

    /// Smallest `ns<N>` not bound in the current scope.
    fn fresh_prefix(&self) -> String {
        (1..)
            .map(|n| format!("ns{n}"))
            .find(|p| self.lookup(p).is_none())
            .unwrap_or_default()
    }
}

/// Single-use encoder writing into an owned buffer.
pub(crate) struct Encoder<'a> {
    schema: &'a Schema,
    writer: Writer<Vec<u8>>,
    scopes: Scopes,
    xml_declaration: bool,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder.
    pub(crate) fn new(schema: &'a Schema, config: &CodecConfig) -> Self {
        let writer = match config.indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };
        Self {
            schema,
            writer,
            scopes: Scopes::new(),
            xml_declaration: config.xml_declaration,
        }
    }

    /// Validates and encodes a document.
    pub(crate) fn encode(mut self, document: &Document) -> Result<Vec<u8>, EncodeError> {
        let schema = self.schema;
        let root = schema
            .get_root(&document.root)
            .ok_or_else(|| EncodeError::UnknownRoot {
                name: document.root.clone(),
            })?;
        let type_def = schema
            .get_type(&root.type_name)
            .ok_or_else(|| EncodeError::UnknownType {
                name: root.type_name.clone(),
            })?;

        validate_record(schema, type_def, &document.record, &document.root)?;
        tracing::debug!("Encoding root element '{}' as {}", root.name, type_def.name);

        if self.xml_declaration {
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let (name, declarations) = match (&schema.target_namespace, schema.element_form) {
            (Some(tns), Form::Qualified) => (root.name.clone(), vec![(String::new(), tns.clone())]),
            (Some(tns), Form::Unqualified) => {
                let prefix = schema.prefix.as_deref().unwrap_or(DEFAULT_ROOT_PREFIX);
                (
                    format!("{prefix}:{}", root.name),
                    vec![(prefix.to_string(), tns.clone())],
                )
            }
            (None, _) => (root.name.clone(), Vec::new()),
        };

        self.write_record(&name, &document.record, type_def, declarations)?;
        Ok(self.writer.into_inner())
    }

    /// Writes a record as an element named `name`.
    fn write_record(
        &mut self,
        name: &str,
        record: &Record,
        type_def: &ComplexTypeDef,
        declarations: Vec<(String, String)>,
    ) -> Result<(), EncodeError> {
        self.scopes.push();
        for (prefix, uri) in &declarations {
            self.scopes.declare(prefix, uri);
        }
        let mut declarations = declarations;

        let mut attributes = Vec::new();
        for field in type_def.attributes() {
            if let Some(value) = record.get(&field.name) {
                attributes.push((field.name.clone(), format_field(field, &field.kind, value)?));
            }
        }
        for (qname, value) in record.other_attributes() {
            let attr_name = self.attribute_name(qname, &mut declarations);
            attributes.push((attr_name, value.clone()));
        }

        let start = start_tag(name, &declarations, &attributes);

        if let Some(field) = type_def.text_field() {
            let text = record
                .get(&field.name)
                .map(|value| format_field(field, &field.kind, value))
                .transpose()?
                .unwrap_or_default();
            self.write_text_element(start, name, &text)?;
        } else if has_element_content(type_def, record) {
            self.writer.write_event(Event::Start(start))?;
            for field in type_def.elements() {
                let Some(value) = record.get(&field.name) else {
                    continue;
                };
                let items = match value {
                    FieldValue::Sequence(items) if field.is_repeated() => items.as_slice(),
                    single => std::slice::from_ref(single),
                };
                for item in items {
                    self.write_field_element(field, item)?;
                }
            }
            for element in record.any() {
                self.write_extension(element)?;
            }
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        } else {
            self.writer.write_event(Event::Empty(start))?;
        }

        self.scopes.pop();
        Ok(())
    }

    fn write_field_element(&mut self, field: &FieldDef, value: &FieldValue) -> Result<(), EncodeError> {
        match (&field.kind, value) {
            (FieldKind::Nested(type_name), FieldValue::Record(record)) => {
                let type_def = self
                    .schema
                    .get_type(type_name)
                    .ok_or_else(|| EncodeError::UnknownType {
                        name: type_name.clone(),
                    })?;
                self.write_record(&field.name, record, type_def, Vec::new())
            }
            (kind, value) => {
                let text = format_field(field, kind, value)?;
                self.write_text_element(BytesStart::new(field.name.as_str()), &field.name, &text)
            }
        }
    }

    fn write_text_element(&mut self, start: BytesStart<'_>, name: &str, text: &str) -> Result<(), EncodeError> {
        if text.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }

    fn write_extension(&mut self, element: &ExtensionElement) -> Result<(), EncodeError> {
        self.scopes.push();
        let mut declarations = Vec::new();
        let name = self.element_name(element, &mut declarations);

        let attributes: Vec<(String, String)> = element
            .attributes
            .iter()
            .map(|(qname, value)| (self.attribute_name(qname, &mut declarations), value.clone()))
            .collect();
        let start = start_tag(&name, &declarations, &attributes);

        let content = element.content();
        if content.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            for child in content {
                match child {
                    Content::Element(child) => self.write_extension(child)?,
                    Content::Text(text) => self.writer.write_event(Event::Text(BytesText::new(&text)))?,
                }
            }
            self.writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }

        self.scopes.pop();
        Ok(())
    }

    /// Qualified tag for an extension element, declaring its namespace if needed.
    fn element_name(&mut self, element: &ExtensionElement, declarations: &mut Vec<(String, String)>) -> String {
        let local = &element.name.local;
        let Some(uri) = element.name.namespace() else {
            if self.scopes.default_namespace().is_some() {
                self.bind("", "", declarations);
            }
            return local.clone();
        };

        if self.scopes.default_namespace() == Some(uri) {
            return local.clone();
        }
        if let Some(prefix) = self.scopes.prefix_for(uri) {
            return format!("{prefix}:{local}");
        }

        match element.prefix.as_deref() {
            None => {
                self.bind("", uri, declarations);
                local.clone()
            }
            Some(preferred) => {
                let prefix = if is_declarable(preferred) && self.scopes.lookup(preferred).is_none() {
                    preferred.to_string()
                } else {
                    self.scopes.fresh_prefix()
                };
                self.bind(&prefix, uri, declarations);
                format!("{prefix}:{local}")
            }
        }
    }

    /// Qualified name for an attribute, declaring a prefix if needed.
    fn attribute_name(&mut self, name: &QName, declarations: &mut Vec<(String, String)>) -> String {
        let Some(uri) = name.namespace() else {
            return name.local.clone();
        };
        let prefix = match self.scopes.prefix_for(uri) {
            Some(prefix) => prefix.to_string(),
            None => {
                let prefix = self.scopes.fresh_prefix();
                self.bind(&prefix, uri, declarations);
                prefix
            }
        };
        format!("{prefix}:{}", name.local)
    }

    fn bind(&mut self, prefix: &str, uri: &str, declarations: &mut Vec<(String, String)>) {
        self.scopes.declare(prefix, uri);
        declarations.push((prefix.to_string(), uri.to_string()));
    }
}

/// Builds a start tag with namespace declarations ahead of attributes.
fn start_tag<'t>(
    name: &'t str,
    declarations: &[(String, String)],
    attributes: &[(String, String)],
) -> BytesStart<'t> {
    let mut start = BytesStart::new(name);
    for (prefix, uri) in declarations {
        if prefix.is_empty() {
            start.push_attribute(("xmlns", uri.as_str()));
        } else {
            start.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
        }
    }
    for (key, value) in attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    start
}

fn format_field(field: &FieldDef, kind: &FieldKind, value: &FieldValue) -> Result<String, EncodeError> {
    format_value(kind, field.white_space, value).ok_or_else(|| {
        EncodeError::Validation(ValidationError::mismatch(
            field.name.as_str(),
            kind.to_string(),
            value.kind_name(),
        ))
    })
}

fn has_element_content(type_def: &ComplexTypeDef, record: &Record) -> bool {
    !record.any().is_empty()
        || type_def.elements().any(|field| match record.get(&field.name) {
            Some(FieldValue::Sequence(items)) if field.is_repeated() => !items.is_empty(),
            Some(_) => true,
            None => false,
        })
}

fn is_declarable(prefix: &str) -> bool {
    !prefix.is_empty() && !prefix.to_ascii_lowercase().starts_with("xml")
}
