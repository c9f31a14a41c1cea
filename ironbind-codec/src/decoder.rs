//! Document decoder.
//!
//! Each complex type is read by a small state machine: attributes first,
//! then the element sequence with a cursor into the type's element fields,
//! then trailing extension content admitted by the type's wildcard.
//! Simple-content types read their character data instead of a sequence.

use crate::config::{CodecConfig, ForeignContent};
use crate::error::DecodeError;
use crate::scalar::parse_value;
use crate::validator::{field_path, item_path, validate_item};
use ironbind_core::lexical::{apply_white_space, is_xml_whitespace};
use ironbind_core::{
    Document, ExtensionElement, FieldValue, QName, Record, ValidationError, XmlNode,
};
use ironbind_schema::{ComplexTypeDef, FieldDef, FieldKind, Schema};
use quick_xml::NsReader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;

/// XML Schema instance namespace; its attributes are never data.
pub(crate) const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Position of the sequence state machine inside one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Reading typed child elements; `count` occurrences of field `index` seen.
    Sequence { index: usize, count: usize },
    /// Reading wildcard content; typed elements are no longer accepted.
    Extensions,
}

/// Single-use decoder over an in-memory document.
pub(crate) struct Decoder<'a, 'i> {
    schema: &'a Schema,
    config: &'a CodecConfig,
    reader: NsReader<&'i [u8]>,
}

impl<'a, 'i> Decoder<'a, 'i> {
    /// Creates a decoder for `input`.
    pub(crate) fn new(schema: &'a Schema, config: &'a CodecConfig, input: &'i [u8]) -> Self {
        Self {
            schema,
            config,
            reader: NsReader::from_reader(input),
        }
    }

    /// Decodes the whole document.
    pub(crate) fn decode(mut self) -> Result<Document, DecodeError> {
        let document = loop {
            match self.reader.read_event()? {
                Event::Start(e) => break self.decode_root(&e, false)?,
                Event::Empty(e) => break self.decode_root(&e, true)?,
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(DecodeError::malformed("character data before the root element"));
                }
                Event::End(_) => return Err(DecodeError::malformed("unmatched end tag")),
                Event::Eof => return Err(DecodeError::malformed("document has no root element")),
                _ => {}
            }
        };

        loop {
            match self.reader.read_event()? {
                Event::Eof => break,
                Event::Text(t) if is_blank(&t) => {}
                Event::Start(_) | Event::Empty(_) => {
                    return Err(DecodeError::malformed("more than one root element"));
                }
                Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) | Event::End(_) => {
                    return Err(DecodeError::malformed("content after the root element"));
                }
                _ => {}
            }
        }

        Ok(document)
    }

    fn decode_root(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<Document, DecodeError> {
        let (namespace, local) = self.resolve_element(start)?;
        let target = self.schema.target_namespace.as_deref();

        if namespace.as_deref() != target {
            return Err(DecodeError::unexpected_element(
                "",
                local,
                "a root element in the target namespace",
            ));
        }
        let Some(root) = self.schema.get_root(&local) else {
            let expected = format!("a root element of schema '{}'", self.schema.name);
            return Err(DecodeError::unexpected_element("", local, expected));
        };
        let type_def = self
            .schema
            .get_type(&root.type_name)
            .ok_or_else(|| DecodeError::UnknownType {
                name: root.type_name.clone(),
            })?;

        tracing::debug!("Decoding root element '{}' as {}", local, type_def.name);
        let record = self.decode_record(start, type_def, &local, empty, 1)?;
        Ok(Document::new(local, record))
    }

    /// Decodes an element of complex type into a record.
    fn decode_record(
        &mut self,
        start: &BytesStart<'_>,
        type_def: &ComplexTypeDef,
        path: &str,
        empty: bool,
        depth: usize,
    ) -> Result<Record, DecodeError> {
        self.check_depth(path, depth)?;

        let mut record = Record::new(type_def.name.as_str());
        tracing::trace!("{}: reading attributes of {}", path, type_def.name);
        self.decode_attributes(start, type_def, path, &mut record)?;

        if let Some(field) = type_def.text_field() {
            let text = if empty {
                String::new()
            } else {
                self.read_character_data(path)?
            };
            // Empty character data leaves an optional text field unset.
            if field.is_required() || !apply_white_space(&text, field.white_space).is_empty() {
                let field_path = field_path(path, field);
                let value = parse_value(&field.kind, field.white_space, &text, &field_path)?;
                validate_item(self.schema, field, &value, &field_path)?;
                record.set(field.name.as_str(), value);
            }
        } else {
            self.decode_sequence(type_def, path, empty, depth, &mut record)?;
        }

        Ok(record)
    }

    fn decode_attributes(
        &self,
        start: &BytesStart<'_>,
        type_def: &ComplexTypeDef,
        path: &str,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        let target = self.schema.target_namespace.as_deref();

        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (namespace, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_of(namespace)?;
            let local = std::str::from_utf8(local.as_ref())?.to_string();
            let value = unescape(std::str::from_utf8(&attr.value)?)?.into_owned();

            if namespace.as_deref() == Some(XSI_NAMESPACE) {
                tracing::warn!("Skipping xsi:{} attribute at '{}'", local, path);
                continue;
            }

            if namespace.is_none() {
                if let Some(field) = type_def.attributes().find(|f| f.name == local) {
                    let field_path = field_path(path, field);
                    let value = parse_value(&field.kind, field.white_space, &value, &field_path)?;
                    validate_item(self.schema, field, &value, &field_path)?;
                    record.set(field.name.as_str(), value);
                    continue;
                }
            }

            let admitted = type_def
                .any_attribute
                .as_ref()
                .is_some_and(|w| w.admits(namespace.as_deref(), target));
            if !admitted {
                return Err(DecodeError::UnexpectedAttribute {
                    path: path.to_string(),
                    name: local,
                });
            }
            if let Some(ns) = namespace.as_deref().filter(|ns| self.rejects(Some(*ns))) {
                return Err(DecodeError::unknown_namespace(path, format!("@{local}"), ns));
            }

            let name = QName { namespace, local };
            tracing::debug!("Captured extension attribute {} at '{}'", name, path);
            record.other_attributes_mut().insert(name, value);
        }

        for field in type_def.attributes() {
            if field.is_required() && !record.is_set(&field.name) {
                return Err(ValidationError::missing(field_path(path, field)).into());
            }
        }

        Ok(())
    }

    /// Runs the sequence state machine over the children of an element.
    fn decode_sequence(
        &mut self,
        type_def: &ComplexTypeDef,
        path: &str,
        empty: bool,
        depth: usize,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        let schema = self.schema;
        let elements: Vec<&FieldDef> = type_def.elements().collect();
        let typed_namespace = schema.local_element_namespace();
        let mut phase = Phase::Sequence { index: 0, count: 0 };

        while !empty {
            let (start, child_empty) = match self.reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::Text(t) if is_blank(&t) => continue,
                Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => {
                    return Err(DecodeError::UnexpectedText {
                        path: path.to_string(),
                    });
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(DecodeError::malformed(format!(
                        "unexpected end of document inside '{path}'"
                    )));
                }
                _ => continue,
            };
            let (namespace, local) = self.resolve_element(&start)?;

            if let Phase::Sequence { index, count } = phase {
                let matched = if namespace.as_deref() == typed_namespace {
                    elements[index..].iter().position(|f| f.name == local)
                } else {
                    None
                };

                if let Some(offset) = matched {
                    let (index, count) = if offset == 0 {
                        (index, count + 1)
                    } else {
                        if let Some((missing, _)) = first_unsatisfied(&elements, index, count, index + offset) {
                            let expected = format!("'{}'", missing.name);
                            return Err(DecodeError::unexpected_element(path, local, expected));
                        }
                        (index + offset, 1)
                    };
                    phase = Phase::Sequence { index, count };

                    let field = elements[index];
                    let field_path = field_path(path, field);
                    if !field.occurs.max.admits(count) {
                        return Err(ValidationError::cardinality(field_path, count, field.occurs).into());
                    }
                    tracing::trace!("{}: sequence[{}] matched '{}'", path, index, field.name);

                    if field.is_repeated() {
                        let child_path = item_path(&field_path, count - 1);
                        let value = self.decode_field_element(&start, field, &child_path, child_empty, depth + 1)?;
                        record.sequence_mut(&field.name).push(value);
                    } else {
                        let value = self.decode_field_element(&start, field, &field_path, child_empty, depth + 1)?;
                        record.set(field.name.as_str(), value);
                    }
                    continue;
                }
            }

            let target = schema.target_namespace.as_deref();
            let Some(wildcard) = type_def
                .any_element
                .as_ref()
                .filter(|w| w.admits(namespace.as_deref(), target))
            else {
                let expected = describe_expected(&elements, phase);
                return Err(DecodeError::unexpected_element(path, local, expected));
            };

            if let Phase::Sequence { index, count } = phase {
                if let Some((missing, _)) = first_unsatisfied(&elements, index, count, elements.len()) {
                    let expected = format!("'{}'", missing.name);
                    return Err(DecodeError::unexpected_element(path, local, expected));
                }
                tracing::trace!("{}: switching to extension content", path);
                phase = Phase::Extensions;
            }

            if let Some(ns) = namespace.as_deref().filter(|ns| self.rejects(Some(*ns))) {
                return Err(DecodeError::unknown_namespace(path, local, ns));
            }

            let child_path = format!("{path}/{local}");
            let element = self.capture_element(&start, namespace, local, &child_path, child_empty, depth + 1)?;
            tracing::debug!("Captured extension element {} at '{}'", element.name, path);
            record.any_mut().push(element);

            if !wildcard.occurs.max.admits(record.any().len()) {
                return Err(ValidationError::cardinality(
                    format!("{path}/any"),
                    record.any().len(),
                    wildcard.occurs,
                )
                .into());
            }
        }

        if let Phase::Sequence { index, count } = phase {
            if let Some((missing, seen)) = first_unsatisfied(&elements, index, count, elements.len()) {
                let missing_path = field_path(path, missing);
                return Err(if seen == 0 {
                    ValidationError::missing(missing_path)
                } else {
                    ValidationError::cardinality(missing_path, seen, missing.occurs)
                }
                .into());
            }
        }

        if let Some(wildcard) = &type_def.any_element {
            if !wildcard.occurs.admits(record.any().len()) {
                return Err(ValidationError::cardinality(
                    format!("{path}/any"),
                    record.any().len(),
                    wildcard.occurs,
                )
                .into());
            }
        }

        Ok(())
    }

    /// Decodes the value of a typed child element.
    fn decode_field_element(
        &mut self,
        start: &BytesStart<'_>,
        field: &FieldDef,
        path: &str,
        empty: bool,
        depth: usize,
    ) -> Result<FieldValue, DecodeError> {
        if let FieldKind::Nested(type_name) = &field.kind {
            let type_def = self
                .schema
                .get_type(type_name)
                .ok_or_else(|| DecodeError::UnknownType {
                    name: type_name.clone(),
                })?;
            return self
                .decode_record(start, type_def, path, empty, depth)
                .map(FieldValue::Record);
        }

        self.check_depth(path, depth)?;
        self.check_simple_attributes(start, path)?;
        let text = if empty {
            String::new()
        } else {
            self.read_character_data(path)?
        };
        let value = parse_value(&field.kind, field.white_space, &text, path)?;
        validate_item(self.schema, field, &value, path)?;
        Ok(value)
    }

    /// Simple-typed elements carry no attributes besides namespace
    /// declarations and `xsi:*`.
    fn check_simple_attributes(&self, start: &BytesStart<'_>, path: &str) -> Result<(), DecodeError> {
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (namespace, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_of(namespace)?;
            let local = std::str::from_utf8(local.as_ref())?.to_string();
            if namespace.as_deref() == Some(XSI_NAMESPACE) {
                tracing::warn!("Skipping xsi:{} attribute at '{}'", local, path);
                continue;
            }
            return Err(DecodeError::UnexpectedAttribute {
                path: path.to_string(),
                name: local,
            });
        }
        Ok(())
    }

    /// Reads character data up to the end of the current element.
    fn read_character_data(&mut self, path: &str) -> Result<String, DecodeError> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&unescape_text(&t)?),
                Event::CData(c) => text.push_str(std::str::from_utf8(&c)?),
                Event::GeneralRef(r) => text.push_str(&resolve_reference(std::str::from_utf8(&r)?)?),
                Event::Start(e) | Event::Empty(e) => {
                    let (_, local) = self.resolve_element(&e)?;
                    return Err(DecodeError::unexpected_element(path, local, "character data"));
                }
                Event::End(_) => return Ok(text),
                Event::Eof => {
                    return Err(DecodeError::malformed(format!(
                        "unexpected end of document inside '{path}'"
                    )));
                }
                _ => {}
            }
        }
    }

    /// Captures an element admitted by a wildcard as an opaque tree.
    fn capture_element(
        &mut self,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        local: String,
        path: &str,
        empty: bool,
        depth: usize,
    ) -> Result<ExtensionElement, DecodeError> {
        self.check_depth(path, depth)?;

        let mut element = ExtensionElement::new(QName { namespace, local });
        element.prefix = match start.name().prefix() {
            Some(prefix) => Some(std::str::from_utf8(prefix.as_ref())?.to_string()),
            None => None,
        };

        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (namespace, attr_local) = self.reader.resolve_attribute(attr.key);
            let name = QName {
                namespace: namespace_of(namespace)?,
                local: std::str::from_utf8(attr_local.as_ref())?.to_string(),
            };
            let value = unescape(std::str::from_utf8(&attr.value)?)?.into_owned();
            element.attributes.push((name, value));
        }

        if empty {
            return Ok(element);
        }

        let mut text = String::new();
        loop {
            let (child, child_empty) = match self.reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::Text(t) => {
                    text.push_str(&unescape_text(&t)?);
                    continue;
                }
                Event::CData(c) => {
                    text.push_str(std::str::from_utf8(&c)?);
                    continue;
                }
                Event::GeneralRef(r) => {
                    text.push_str(&resolve_reference(std::str::from_utf8(&r)?)?);
                    continue;
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(DecodeError::malformed(format!(
                        "unexpected end of document inside '{path}'"
                    )));
                }
                _ => continue,
            };

            flush_text(&mut element, &mut text);
            let (namespace, local) = self.resolve_element(&child)?;
            let child_path = format!("{path}/{local}");
            let child = self.capture_element(&child, namespace, local, &child_path, child_empty, depth + 1)?;
            element.children.push(XmlNode::Element(child));
        }
        flush_text(&mut element, &mut text);

        Ok(element)
    }

    fn resolve_element(&self, start: &BytesStart<'_>) -> Result<(Option<String>, String), DecodeError> {
        let (namespace, local) = self.reader.resolve_element(start.name());
        let namespace = namespace_of(namespace)?;
        let local = std::str::from_utf8(local.as_ref())?.to_string();
        Ok((namespace, local))
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<(), DecodeError> {
        if depth > self.config.max_depth {
            return Err(DecodeError::NestingTooDeep {
                path: path.to_string(),
                max_depth: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Qualified and outside the target namespace.
    fn is_foreign(&self, namespace: Option<&str>) -> bool {
        namespace.is_some() && namespace != self.schema.target_namespace.as_deref()
    }

    /// True when admitted content must still be refused under strict mode.
    fn rejects(&self, namespace: Option<&str>) -> bool {
        self.config.foreign_content == ForeignContent::Reject && self.is_foreign(namespace)
    }
}

/// First element field in `index..end` whose minimum is not met, with the
/// number of occurrences seen so far.
fn first_unsatisfied<'f>(
    elements: &[&'f FieldDef],
    index: usize,
    count: usize,
    end: usize,
) -> Option<(&'f FieldDef, usize)> {
    let current = elements
        .get(index)
        .filter(|f| index < end && count < f.occurs.min as usize)
        .map(|f| (*f, count));
    current.or_else(|| {
        elements
            .iter()
            .take(end)
            .skip(index + 1)
            .find(|f| f.occurs.min > 0)
            .map(|f| (*f, 0))
    })
}

fn describe_expected(elements: &[&FieldDef], phase: Phase) -> String {
    match phase {
        Phase::Sequence { index, .. } if index < elements.len() => elements[index..]
            .iter()
            .map(|f| format!("'{}'", f.name))
            .collect::<Vec<_>>()
            .join(" or "),
        Phase::Sequence { .. } => "end of element".to_string(),
        Phase::Extensions => "extension content or end of element".to_string(),
    }
}

fn namespace_of(result: ResolveResult<'_>) -> Result<Option<String>, DecodeError> {
    match result {
        ResolveResult::Bound(ns) if ns.as_ref().is_empty() => Ok(None),
        ResolveResult::Bound(ns) => Ok(Some(std::str::from_utf8(ns.as_ref())?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(DecodeError::malformed(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn unescape_text(text: &BytesText<'_>) -> Result<String, DecodeError> {
    let raw = std::str::from_utf8(text)?;
    Ok(unescape(raw)?.into_owned())
}

/// Resolves a character or predefined entity reference (without `&` and `;`).
fn resolve_reference(name: &str) -> Result<String, DecodeError> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return parsed
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| DecodeError::malformed(format!("invalid character reference '&{name};'")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::malformed(format!("undefined entity '&{name};'")))
}

/// Moves pending character data into `element`, dropping it if blank.
fn flush_text(element: &mut ExtensionElement, text: &mut String) {
    if text.chars().all(is_xml_whitespace) {
        text.clear();
    } else {
        element.children.push(XmlNode::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EBICS_NS, keyresponse_schema};
    use ironbind_core::NumericConstraint;

    fn decode(xml: &str) -> Result<Document, DecodeError> {
        let schema = keyresponse_schema();
        let config = CodecConfig::default();
        Decoder::new(&schema, &config, xml.as_bytes()).decode()
    }

    fn decode_with(xml: &str, config: CodecConfig) -> Result<Document, DecodeError> {
        let schema = keyresponse_schema();
        Decoder::new(&schema, &config, xml.as_bytes()).decode()
    }

    #[test]
    fn test_decode_attributes_and_canonical_values() {
        let doc = decode(&format!(
            r#"<?xml version="1.0"?>
<HVTOrderFlags xmlns="{EBICS_NS}" completeOrderData="1" fetchLimit="0042" fetchOffset="+0"/>"#
        ))
        .unwrap();

        assert_eq!(doc.root, "HVTOrderFlags");
        assert_eq!(doc.record.boolean("completeOrderData"), Some(true));
        assert_eq!(doc.record.integer("fetchLimit"), Some(42));
        assert_eq!(doc.record.integer("fetchOffset"), Some(0));
    }

    #[test]
    fn test_decode_numeric_bounds() {
        let ok = decode(&format!(
            r#"<HVTOrderFlags xmlns="{EBICS_NS}" completeOrderData="true" fetchLimit="9999999999" fetchOffset="0"/>"#
        ))
        .unwrap();
        assert_eq!(ok.record.integer("fetchLimit"), Some(9_999_999_999));

        for bad in ["10000000000", "-1"] {
            let err = decode(&format!(
                r#"<HVTOrderFlags xmlns="{EBICS_NS}" completeOrderData="true" fetchLimit="{bad}" fetchOffset="0"/>"#
            ))
            .unwrap_err();
            assert!(
                matches!(
                    err,
                    DecodeError::Validation(ValidationError::NumericRangeViolation { ref field, .. })
                        if field == "HVTOrderFlags/@fetchLimit"
                ),
                "unexpected error for {bad}: {err}"
            );
        }
    }

    #[test]
    fn test_decode_missing_required_attribute() {
        let err = decode(&format!(
            r#"<HVTOrderFlags xmlns="{EBICS_NS}" completeOrderData="true" fetchLimit="1"/>"#
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Validation(ValidationError::MissingRequiredField { ref field })
                if field == "HVTOrderFlags/@fetchOffset"
        ));
    }

    #[test]
    fn test_decode_extension_attributes() {
        let doc = decode(&format!(
            r#"<HVTOrderFlags xmlns="{EBICS_NS}" xmlns:e="{EBICS_NS}" completeOrderData="false"
                 fetchLimit="1" fetchOffset="2" e:Hint="a &amp; b" xsi:nil="false"
                 xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"/>"#
        ))
        .unwrap();

        let attrs = doc.record.other_attributes();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get(&QName::new(EBICS_NS, "Hint")), Some("a & b"));
    }

    #[test]
    fn test_decode_foreign_attribute_not_admitted() {
        let err = decode(&format!(
            r#"<HVTOrderFlags xmlns="{EBICS_NS}" xmlns:f="urn:foreign" completeOrderData="false"
                 fetchLimit="1" fetchOffset="2" f:Hint="x"/>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedAttribute { ref name, .. } if name == "Hint"));

        let err = decode(&format!(
            r#"<HVTOrderFlags xmlns="{EBICS_NS}" completeOrderData="false"
                 fetchLimit="1" fetchOffset="2" color="red"/>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedAttribute { ref name, .. } if name == "color"));
    }

    #[test]
    fn test_decode_sequence_and_cardinality() {
        let doc = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">USER0001</UserID>
  <Name>Jane
  Doe</Name>
  <Permission AuthorisationLevel="E"><OrderTypes>HIA  HPB</OrderTypes></Permission>
  <Permission AuthorisationLevel="A"/>
</UserInfo>"#
        ))
        .unwrap();

        let user_id = doc.record.record("UserID").unwrap();
        assert_eq!(user_id.text("value"), Some("USER0001"));
        assert_eq!(user_id.integer("Status"), Some(1));
        assert_eq!(doc.record.text("Name"), Some("Jane   Doe"));

        let permissions = doc.record.sequence("Permission");
        assert_eq!(permissions.len(), 2);
        let first = permissions[0].as_record().unwrap();
        assert_eq!(
            first.sequence("OrderTypes"),
            &[FieldValue::from("HIA"), FieldValue::from("HPB")][..]
        );
    }

    #[test]
    fn test_decode_missing_required_element() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}"><UserID Status="1">U</UserID></UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Validation(ValidationError::MissingRequiredField { ref field })
                if field == "UserInfo/Permission"
        ));
    }

    #[test]
    fn test_decode_mandatory_element_replaced() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}"><Nickname>x</Nickname></UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { ref tag, .. } if tag == "Nickname"));
    }

    #[test]
    fn test_decode_mandatory_element_replaced_by_foreign_tag() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}"><x:Foo xmlns:x="urn:vendor"/></UserInfo>"#
        ))
        .unwrap_err();
        assert!(
            matches!(err, DecodeError::UnexpectedElement { ref path, ref tag, .. } if path == "UserInfo" && tag == "Foo"),
            "unexpected error: {err}"
        );

        // HVUSigningInfoType declares no wildcard at all.
        let err = decode(&format!(
            r#"<HVUSigningInfo xmlns="{EBICS_NS}" readyToBeSigned="true" NumSigRequired="1"><x:Foo xmlns:x="urn:vendor"/></HVUSigningInfo>"#
        ))
        .unwrap_err();
        assert!(
            matches!(err, DecodeError::UnexpectedElement { ref path, ref tag, .. } if path == "HVUSigningInfo" && tag == "Foo"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_decode_out_of_order_element() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">U</UserID>
  <Permission AuthorisationLevel="E"/>
  <Name>late</Name>
</UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { ref tag, .. } if tag == "Name"));
    }

    #[test]
    fn test_decode_repeat_past_max() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">U</UserID>
  <UserID Status="1">U</UserID>
</UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Validation(ValidationError::CardinalityViolation { actual: 2, .. })
        ));
    }

    #[test]
    fn test_decode_extension_elements() {
        let doc = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}" xmlns:x="urn:vendor">
  <UserID Status="1">U</UserID>
  <Permission AuthorisationLevel="E"/>
  <x:Audit id="7">
    <!-- ignored -->
    <x:Entry>first &lt;one&gt;</x:Entry>
    <Plain xmlns="">text</Plain>
  </x:Audit>
</UserInfo>"#
        ))
        .unwrap();

        let any = doc.record.any();
        assert_eq!(any.len(), 1);
        let audit = &any[0];
        assert_eq!(audit.name, QName::new("urn:vendor", "Audit"));
        assert_eq!(audit.prefix.as_deref(), Some("x"));
        assert_eq!(audit.attribute(&QName::local("id")), Some("7"));

        let children: Vec<_> = audit.child_elements().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].text(), "first <one>");
        assert_eq!(children[1].name, QName::local("Plain"));
    }

    #[test]
    fn test_decode_typed_element_after_extensions() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">U</UserID>
  <Permission AuthorisationLevel="E"/>
  <x:Audit xmlns:x="urn:vendor"/>
  <Permission AuthorisationLevel="A"/>
</UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { ref tag, .. } if tag == "Permission"));
    }

    #[test]
    fn test_decode_foreign_element_before_required_field() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">U</UserID>
  <x:Audit xmlns:x="urn:vendor"/>
</UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { ref tag, ref expected, .. } if tag == "Audit" && expected == "'Permission'"));
    }

    #[test]
    fn test_decode_strict_foreign_content() {
        let config = CodecConfig {
            foreign_content: ForeignContent::Reject,
            ..CodecConfig::default()
        };
        let err = decode_with(
            &format!(
                r#"<UserInfo xmlns="{EBICS_NS}">
  <UserID Status="1">U</UserID>
  <Permission AuthorisationLevel="E"/>
  <x:Audit xmlns:x="urn:vendor"/>
</UserInfo>"#
            ),
            config,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownNamespace { ref name, ref namespace, .. } if name == "Audit" && namespace == "urn:vendor"
        ));
    }

    #[test]
    fn test_decode_unexpected_text() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}">stray<UserID Status="1">U</UserID></UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedText { ref path } if path == "UserInfo"));
    }

    #[test]
    fn test_decode_enumeration() {
        let err = decode(&format!(
            r#"<UserInfo xmlns="{EBICS_NS}"><UserID Status="9">U</UserID></UserInfo>"#
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Validation(ValidationError::InvalidEnumValue { ref field, .. })
                if field == "UserInfo/UserID/@Status"
        ));
    }

    #[test]
    fn test_decode_positive_integer() {
        let err = decode(&format!(
            r#"<HVUSigningInfo xmlns="{EBICS_NS}" readyToBeSigned="true" NumSigRequired="0"/>"#
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Validation(ValidationError::NumericRangeViolation {
                constraint: NumericConstraint::Positive,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_wrong_root_namespace() {
        let err = decode(r#"<UserInfo xmlns="urn:other"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { ref tag, .. } if tag == "UserInfo"));

        let err = decode(r#"<UserInfo/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedElement { .. }));
    }

    #[test]
    fn test_decode_malformed() {
        for xml in [
            format!(r#"<UserInfo xmlns="{EBICS_NS}"><UserID Status="1">U</Name></UserInfo>"#),
            format!(r#"<UserInfo xmlns="{EBICS_NS}"><UserID Status="1">U</UserID>"#),
            format!(r#"<UserInfo xmlns="{EBICS_NS}"><y:UserID/></UserInfo>"#),
            String::new(),
        ] {
            assert!(
                matches!(decode(&xml), Err(DecodeError::MalformedDocument { .. })),
                "expected malformed: {xml:?}"
            );
        }
    }

    #[test]
    fn test_decode_nesting_limit() {
        let mut xml = format!(
            r#"<UserInfo xmlns="{EBICS_NS}"><UserID Status="1">U</UserID><Permission AuthorisationLevel="E"/><x:A xmlns:x="urn:vendor">"#
        );
        for _ in 0..100 {
            xml.push_str("<x:A>");
        }
        for _ in 0..100 {
            xml.push_str("</x:A>");
        }
        xml.push_str("</x:A></UserInfo>");

        let err = decode(&xml).unwrap_err();
        assert!(matches!(err, DecodeError::NestingTooDeep { max_depth: 64, .. }));
    }
}
