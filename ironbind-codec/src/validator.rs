//! Constraint validation of records against their schema types.
//!
//! Validation is pure: it reads a record and reports violations without
//! modifying anything. Two modes are offered. Fail-fast stops at the first
//! violation and is what the codec uses on encode; collect-all walks the
//! whole tree and returns every violation, for tooling.

use crate::scalar::{canonical_literal, format_value};
use ironbind_core::lexical::{apply_white_space, format_boolean, format_integer, is_xml_whitespace};
use ironbind_core::{FieldValue, QName, Record, ValidationError};
use ironbind_schema::{ComplexTypeDef, FieldDef, FieldKind, NodeKind, Schema};

/// Where violations go.
struct Sink {
    errors: Vec<ValidationError>,
    fail_fast: bool,
}

impl Sink {
    fn fail_fast() -> Self {
        Self {
            errors: Vec::new(),
            fail_fast: true,
        }
    }

    fn collect_all() -> Self {
        Self {
            errors: Vec::new(),
            fail_fast: false,
        }
    }

    fn report(&mut self, error: ValidationError) -> Result<(), ValidationError> {
        if self.fail_fast {
            Err(error)
        } else {
            self.errors.push(error);
            Ok(())
        }
    }
}

/// Validates a record against its type, stopping at the first violation.
///
/// `path` names the element holding the record, e.g. `HTDResponseOrderData`.
///
/// # Errors
/// Returns the first violation found.
pub fn validate_record(
    schema: &Schema,
    type_def: &ComplexTypeDef,
    record: &Record,
    path: &str,
) -> Result<(), ValidationError> {
    let mut sink = Sink::fail_fast();
    check_record(schema, type_def, record, path, &mut sink)
}

/// Validates a record against its type and returns every violation.
#[must_use]
pub fn validate_record_all(
    schema: &Schema,
    type_def: &ComplexTypeDef,
    record: &Record,
    path: &str,
) -> Vec<ValidationError> {
    let mut sink = Sink::collect_all();
    // Collect-all mode never short-circuits.
    let _ = check_record(schema, type_def, record, path, &mut sink);
    sink.errors
}

/// Validates a value about to be stored in `field`.
///
/// Checks the value variant, occurrence count, numeric facets, enumeration
/// and, for nested records, the whole subtree. Absence is not checked here.
///
/// # Errors
/// Returns the first violation found.
pub fn validate_field(
    schema: &Schema,
    field: &FieldDef,
    value: &FieldValue,
    path: &str,
) -> Result<(), ValidationError> {
    let mut sink = Sink::fail_fast();
    check_present_field(schema, field, value, path, &mut sink)
}

/// Validates a single occurrence of `field` (one item of a repeated field).
///
/// # Errors
/// Returns the first violation found.
pub fn validate_item(
    schema: &Schema,
    field: &FieldDef,
    value: &FieldValue,
    path: &str,
) -> Result<(), ValidationError> {
    let mut sink = Sink::fail_fast();
    check_value(schema, field, &field.kind, value, path, &mut sink)
}

/// Path of a field below `path`.
pub(crate) fn field_path(path: &str, field: &FieldDef) -> String {
    format!("{path}/{}", field.path_segment())
}

/// Path of the `index`-th occurrence (from 0) of a repeated field.
pub(crate) fn item_path(path: &str, index: usize) -> String {
    format!("{path}[{}]", index + 1)
}

fn check_record(
    schema: &Schema,
    type_def: &ComplexTypeDef,
    record: &Record,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if record.type_name() != type_def.name {
        return sink.report(ValidationError::mismatch(
            path,
            format!("record of type '{}'", type_def.name),
            format!("record of type '{}'", record.type_name()),
        ));
    }

    for (name, _) in record.fields() {
        if type_def.field(name).is_none() {
            sink.report(ValidationError::UnknownField {
                field: format!("{path}/{name}"),
                type_name: type_def.name.clone(),
            })?;
        }
    }

    for field in &type_def.fields {
        let field_path = field_path(path, field);
        match record.get(&field.name) {
            Some(value) => check_present_field(schema, field, value, &field_path, sink)?,
            None if field.is_required() => sink.report(ValidationError::missing(field_path))?,
            None => {}
        }
    }

    check_extensions(schema, type_def, record, path, sink)
}

fn check_extensions(
    schema: &Schema,
    type_def: &ComplexTypeDef,
    record: &Record,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let target = schema.target_namespace.as_deref();

    for (name, _) in record.other_attributes() {
        let admitted = type_def
            .any_attribute
            .as_ref()
            .is_some_and(|w| w.admits(name.namespace(), target));
        if !admitted || type_def.attributes().any(|f| name == &QName::local(&f.name)) {
            sink.report(ValidationError::UnknownField {
                field: format!("{path}/@{name}"),
                type_name: type_def.name.clone(),
            })?;
        }
    }

    let any = record.any();
    match &type_def.any_element {
        Some(wildcard) => {
            for element in any {
                if !wildcard.admits(element.name.namespace(), target) {
                    sink.report(ValidationError::UnknownField {
                        field: format!("{path}/{}", element.name),
                        type_name: type_def.name.clone(),
                    })?;
                }
            }
            if !wildcard.occurs.admits(any.len()) {
                sink.report(ValidationError::cardinality(
                    format!("{path}/any"),
                    any.len(),
                    wildcard.occurs,
                ))?;
            }
        }
        None => {
            if let Some(element) = any.first() {
                sink.report(ValidationError::UnknownField {
                    field: format!("{path}/{}", element.name),
                    type_name: type_def.name.clone(),
                })?;
            }
        }
    }

    Ok(())
}

fn check_present_field(
    schema: &Schema,
    field: &FieldDef,
    value: &FieldValue,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if field.node == NodeKind::Element && field.is_repeated() {
        let FieldValue::Sequence(items) = value else {
            // A lone value stands for a single occurrence.
            check_count(field, 1, path, sink)?;
            return check_value(schema, field, &field.kind, value, &item_path(path, 0), sink);
        };
        check_count(field, items.len(), path, sink)?;
        for (i, item) in items.iter().enumerate() {
            check_value(schema, field, &field.kind, item, &item_path(path, i), sink)?;
        }
        Ok(())
    } else if field.node == NodeKind::Text && !field.is_required() && is_empty_text(field, value) {
        // Encodes exactly like an unset field.
        sink.report(ValidationError::InvalidLexicalForm {
            field: path.to_string(),
            value: String::new(),
            expected: "non-empty text for an optional text field",
        })
    } else {
        check_value(schema, field, &field.kind, value, path, sink)
    }
}

fn is_empty_text(field: &FieldDef, value: &FieldValue) -> bool {
    format_value(&field.kind, field.white_space, value).is_some_and(|text| text.is_empty())
}

fn check_count(
    field: &FieldDef,
    count: usize,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if field.occurs.admits(count) {
        Ok(())
    } else {
        sink.report(ValidationError::cardinality(path, count, field.occurs))
    }
}

fn check_value(
    schema: &Schema,
    field: &FieldDef,
    kind: &FieldKind,
    value: &FieldValue,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    match (kind, value) {
        (FieldKind::Text, FieldValue::Text(text)) => {
            // Encoding would normalize the text, so decode could not give it back.
            if apply_white_space(text, field.white_space) != text.as_str() {
                return sink.report(ValidationError::InvalidLexicalForm {
                    field: path.to_string(),
                    value: text.clone(),
                    expected: "whitespace-normalized text",
                });
            }
            check_enumeration(field, kind, text, path, sink)
        }
        (FieldKind::Integer(facets), FieldValue::Integer(v)) => {
            if let Err(constraint) = facets.check(*v) {
                return sink.report(ValidationError::numeric(path, format_integer(*v), constraint));
            }
            check_enumeration(field, kind, &format_integer(*v), path, sink)
        }
        (FieldKind::Boolean, FieldValue::Boolean(b)) => {
            check_enumeration(field, kind, format_boolean(*b), path, sink)
        }
        (FieldKind::List(item_kind), FieldValue::Sequence(items)) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = item_path(path, i);
                match item {
                    FieldValue::Text(text) if text.is_empty() || text.contains(is_xml_whitespace) => {
                        sink.report(ValidationError::InvalidLexicalForm {
                            field: item_path,
                            value: text.clone(),
                            expected: "list item",
                        })?;
                    }
                    _ => check_value(schema, field, item_kind, item, &item_path, sink)?,
                }
            }
            Ok(())
        }
        (FieldKind::Nested(type_name), FieldValue::Record(record)) => {
            match schema.get_type(type_name) {
                Some(type_def) => check_record(schema, type_def, record, path, sink),
                None => sink.report(ValidationError::mismatch(
                    path,
                    format!("record of type '{type_name}'"),
                    format!("record of type '{}'", record.type_name()),
                )),
            }
        }
        (kind, value) => sink.report(ValidationError::mismatch(
            path,
            kind.to_string(),
            value.kind_name(),
        )),
    }
}

/// Checks a canonical item text against the field's enumeration.
fn check_enumeration(
    field: &FieldDef,
    kind: &FieldKind,
    canonical: &str,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let Some(values) = &field.enumeration else {
        return Ok(());
    };
    let admitted = values
        .iter()
        .filter_map(|literal| canonical_literal(kind, field.white_space, literal))
        .any(|literal| literal == canonical);
    if admitted {
        Ok(())
    } else {
        sink.report(ValidationError::InvalidEnumValue {
            field: path.to_string(),
            value: canonical.to_string(),
        })
    }
}
