//! Binding schema description parser.
//!
//! This module parses binding schema description documents into the
//! internal [`Schema`] representation:
//!
//! ```xml
//! <bind:bindingSchema xmlns:bind="urn:ironbind:schema" name="keyresponse"
//!                     targetNamespace="urn:org:ebics:H004">
//!     <complexType name="HVUSigningInfoType">
//!         <attribute name="readyToBeSigned" type="boolean" use="required"/>
//!         <attribute name="NumSigRequired" type="positiveInteger" use="required"/>
//!     </complexType>
//!     <element name="HVUSigningInfo" type="HVUSigningInfoType"/>
//! </bind:bindingSchema>
//! ```

use crate::error::ParseError;
use crate::types::{
    ComplexTypeDef, FieldDef, FieldKind, Form, NamespaceConstraint, NodeKind, ProcessContents,
    RootElement, Schema, Wildcard,
};
use ironbind_core::{IntegerFacets, MaxOccurs, Occurs, SignConstraint, WhiteSpace};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses a binding schema description from a string.
///
/// # Arguments
/// * `xml` - Schema description content
///
/// # Returns
/// Parsed schema or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid schema elements.
pub fn parse_schema(xml: &str) -> Result<Schema, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut schema: Option<Schema> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e)?;
                match (name.as_str(), schema.as_mut()) {
                    ("bindingSchema", None) => {
                        schema = Some(parse_binding_schema(e)?);
                    }
                    ("complexType", Some(schema)) => {
                        let type_def = parse_complex_type(&mut reader, e)?;
                        schema.add_type(type_def);
                    }
                    (_, Some(_)) => return Err(ParseError::unknown_element(name, "bindingSchema")),
                    (_, None) => return Err(ParseError::unknown_element(name, "document")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e)?;
                match (name.as_str(), schema.as_mut()) {
                    ("element", Some(schema)) => {
                        schema.add_root(parse_root_element(e)?);
                    }
                    ("complexType", Some(schema)) => {
                        schema.add_type(parse_complex_type_header(e)?);
                    }
                    ("bindingSchema", None) => {
                        schema = Some(parse_binding_schema(e)?);
                    }
                    (_, Some(_)) => return Err(ParseError::unknown_element(name, "bindingSchema")),
                    (_, None) => return Err(ParseError::unknown_element(name, "document")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    schema.ok_or_else(|| ParseError::InvalidStructure {
        message: "No bindingSchema element found".to_string(),
    })
}

/// Parses a binding schema description from a file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_schema_file(path: &std::path::Path) -> Result<Schema, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_schema(&xml)
}

/// Returns the local name of an element as a string.
fn local_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(e.local_name().as_ref())?.to_string())
}

/// Collects the non-namespace attributes of an element as unescaped strings.
fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, ParseError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Parses the bindingSchema element attributes.
fn parse_binding_schema(e: &BytesStart<'_>) -> Result<Schema, ParseError> {
    let mut name = None;
    let mut version = None;
    let mut target_namespace = None;
    let mut prefix = None;
    let mut element_form = Form::Qualified;
    let mut description = None;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "version" => version = Some(value),
            "targetNamespace" if !value.is_empty() => target_namespace = Some(value),
            "targetNamespace" => {}
            "prefix" => prefix = Some(value),
            "elementFormDefault" => {
                element_form = Form::parse(&value).ok_or_else(|| {
                    ParseError::invalid_attr("bindingSchema", "elementFormDefault", &value)
                })?
            }
            "description" => description = Some(value),
            _ => return Err(ParseError::invalid_attr("bindingSchema", key, value)),
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("bindingSchema", "name"))?;

    let mut schema = Schema::new(name);
    schema.version = version;
    schema.target_namespace = target_namespace;
    schema.prefix = prefix;
    schema.element_form = element_form;
    schema.description = description;

    Ok(schema)
}

/// Parses a top-level element declaration.
fn parse_root_element(e: &BytesStart<'_>) -> Result<RootElement, ParseError> {
    let mut name = None;
    let mut type_name = None;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "type" => type_name = Some(value),
            _ => return Err(ParseError::invalid_attr("element", key, value)),
        }
    }

    Ok(RootElement::new(
        name.ok_or_else(|| ParseError::missing_attr("element", "name"))?,
        type_name.ok_or_else(|| ParseError::missing_attr("element", "type"))?,
    ))
}

/// Parses the attributes of a complexType element.
fn parse_complex_type_header(e: &BytesStart<'_>) -> Result<ComplexTypeDef, ParseError> {
    let mut name = None;
    let mut description = None;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "description" => description = Some(value),
            _ => return Err(ParseError::invalid_attr("complexType", key, value)),
        }
    }

    let mut type_def =
        ComplexTypeDef::new(name.ok_or_else(|| ParseError::missing_attr("complexType", "name"))?);
    type_def.description = description;
    Ok(type_def)
}

/// Parses a complex type definition with its fields and wildcards.
fn parse_complex_type(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<ComplexTypeDef, ParseError> {
    let mut type_def = parse_complex_type_header(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag_name = local_name(e)?;
                let node = field_node(&tag_name)
                    .ok_or_else(|| ParseError::unknown_element(&tag_name, &type_def.name))?;
                let mut field = parse_field(e, node)?;
                field.enumeration = parse_enumeration(reader, &tag_name)?;
                type_def.add_field(field);
            }
            Ok(Event::Empty(ref e)) => {
                let tag_name = local_name(e)?;
                match tag_name.as_str() {
                    "anyAttribute" => type_def.any_attribute = Some(parse_wildcard(e, &tag_name)?),
                    "any" => type_def.any_element = Some(parse_wildcard(e, &tag_name)?),
                    _ => {
                        let node = field_node(&tag_name)
                            .ok_or_else(|| ParseError::unknown_element(&tag_name, &type_def.name))?;
                        type_def.add_field(parse_field(e, node)?);
                    }
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated complexType '{}'", type_def.name),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(type_def)
}

/// Maps a field tag to its node kind.
fn field_node(tag_name: &str) -> Option<NodeKind> {
    match tag_name {
        "attribute" => Some(NodeKind::Attribute),
        "element" => Some(NodeKind::Element),
        "text" => Some(NodeKind::Text),
        _ => None,
    }
}

/// Parses a field declaration (attribute, element or text).
fn parse_field(e: &BytesStart<'_>, node: NodeKind) -> Result<FieldDef, ParseError> {
    let tag = match node {
        NodeKind::Attribute => "attribute",
        NodeKind::Element => "element",
        NodeKind::Text => "text",
    };

    let mut name = None;
    let mut type_name = None;
    let mut required = None;
    let mut min_occurs = None;
    let mut max_occurs = None;
    let mut total_digits = None;
    let mut sign = None;
    let mut white_space = None;
    let mut list = false;
    let mut description = None;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "type" => type_name = Some(value),
            "use" if node == NodeKind::Attribute => {
                required = Some(match value.as_str() {
                    "required" => true,
                    "optional" => false,
                    _ => return Err(ParseError::invalid_attr(tag, "use", value)),
                })
            }
            "minOccurs" if node == NodeKind::Element => {
                min_occurs = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| ParseError::invalid_attr(tag, "minOccurs", &value))?,
                )
            }
            "maxOccurs" if node == NodeKind::Element => {
                max_occurs = Some(
                    MaxOccurs::parse(&value)
                        .ok_or_else(|| ParseError::invalid_attr(tag, "maxOccurs", &value))?,
                )
            }
            "totalDigits" => {
                total_digits = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| ParseError::invalid_attr(tag, "totalDigits", &value))?,
                )
            }
            "sign" => {
                sign = Some(
                    SignConstraint::parse(&value)
                        .ok_or_else(|| ParseError::invalid_attr(tag, "sign", &value))?,
                )
            }
            "whiteSpace" => {
                white_space = Some(
                    WhiteSpace::parse(&value)
                        .ok_or_else(|| ParseError::invalid_attr(tag, "whiteSpace", &value))?,
                )
            }
            "list" => {
                list = value
                    .parse()
                    .map_err(|_| ParseError::invalid_attr(tag, "list", &value))?
            }
            "description" => description = Some(value),
            _ => return Err(ParseError::invalid_attr(tag, key, value)),
        }
    }

    let name = match (name, node) {
        (Some(name), _) => name,
        (None, NodeKind::Text) => "value".to_string(),
        (None, _) => return Err(ParseError::missing_attr(tag, "name")),
    };
    let type_name = type_name.ok_or_else(|| ParseError::missing_attr(tag, "type"))?;

    let (mut kind, default_white_space) = FieldKind::builtin(&type_name)
        .unwrap_or_else(|| (FieldKind::Nested(type_name.clone()), WhiteSpace::Preserve));

    if total_digits.is_some() || sign.is_some() {
        match &mut kind {
            FieldKind::Integer(facets) => {
                *facets = IntegerFacets::new(
                    total_digits.or(facets.total_digits),
                    sign.unwrap_or(facets.sign),
                );
            }
            _ => {
                return Err(ParseError::invalid_attr(
                    tag,
                    if total_digits.is_some() { "totalDigits" } else { "sign" },
                    type_name,
                ));
            }
        }
    }
    if list {
        kind = FieldKind::list(kind);
    }

    let occurs = match node {
        NodeKind::Element => Occurs::new(
            min_occurs.unwrap_or(1),
            max_occurs.unwrap_or(MaxOccurs::Bounded(1)),
        ),
        NodeKind::Attribute if required == Some(true) => Occurs::REQUIRED,
        NodeKind::Attribute | NodeKind::Text => Occurs::OPTIONAL,
    };

    let mut field = match node {
        NodeKind::Attribute => FieldDef::attribute(name, kind),
        NodeKind::Element => FieldDef::element(name, kind),
        NodeKind::Text => FieldDef::text(name, kind),
    }
    .occurs(occurs)
    .with_white_space(white_space.unwrap_or(default_white_space));
    field.description = description;

    Ok(field)
}

/// Reads `enumeration` children up to the end of a field declaration.
fn parse_enumeration(
    reader: &mut Reader<&[u8]>,
    context: &str,
) -> Result<Option<Vec<String>>, ParseError> {
    let mut values = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) => {
                let tag_name = local_name(e)?;
                if tag_name != "enumeration" {
                    return Err(ParseError::unknown_element(tag_name, context));
                }
                let value = attributes(e)?
                    .into_iter()
                    .find(|(k, _)| k == "value")
                    .map(|(_, v)| v)
                    .ok_or_else(|| ParseError::missing_attr("enumeration", "value"))?;
                values.push(value);
            }
            Ok(Event::Start(ref e)) => {
                return Err(ParseError::unknown_element(local_name(e)?, context));
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated {context} declaration"),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(if values.is_empty() { None } else { Some(values) })
}

/// Parses an `any` or `anyAttribute` wildcard.
fn parse_wildcard(e: &BytesStart<'_>, tag: &str) -> Result<Wildcard, ParseError> {
    let mut namespace = NamespaceConstraint::Any;
    let mut process_contents = ProcessContents::Strict;
    let mut min_occurs = 0;
    let mut max_occurs = MaxOccurs::Unbounded;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "namespace" => {
                namespace = NamespaceConstraint::parse(&value)
                    .ok_or_else(|| ParseError::invalid_attr(tag, "namespace", &value))?
            }
            "processContents" => {
                process_contents = ProcessContents::parse(&value)
                    .ok_or_else(|| ParseError::invalid_attr(tag, "processContents", &value))?
            }
            "minOccurs" if tag == "any" => {
                min_occurs = value
                    .parse()
                    .map_err(|_| ParseError::invalid_attr(tag, "minOccurs", &value))?
            }
            "maxOccurs" if tag == "any" => {
                max_occurs = MaxOccurs::parse(&value)
                    .ok_or_else(|| ParseError::invalid_attr(tag, "maxOccurs", &value))?
            }
            _ => return Err(ParseError::invalid_attr(tag, key, value)),
        }
    }

    Ok(Wildcard {
        namespace,
        process_contents,
        occurs: Occurs::new(min_occurs, max_occurs),
    })
}
