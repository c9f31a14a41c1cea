//! Schema validation utilities.
//!
//! This module checks a schema for internal consistency before a codec is
//! built from it: every reference resolves, every occurrence range and facet
//! is well formed, and no type requires an infinite document.

use crate::error::SchemaError;
use crate::types::{ComplexTypeDef, FieldDef, FieldKind, NodeKind, Schema};
use ironbind_core::lexical::{parse_bounded_integer, parse_boolean, split_list};
use ironbind_core::{IntegerFacets, MaxOccurs, Occurs, WhiteSpace};
use std::collections::HashSet;

/// Validates a schema for correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    validate_names(schema)?;
    validate_roots(schema)?;
    for type_def in &schema.types {
        validate_type(schema, type_def)?;
    }
    validate_required_nesting(schema)?;
    Ok(())
}

/// Checks that type and root names are unique.
fn validate_names(schema: &Schema) -> Result<(), SchemaError> {
    let mut seen_types = HashSet::new();
    for type_def in &schema.types {
        if !seen_types.insert(type_def.name.as_str()) {
            return Err(SchemaError::duplicate("type", &type_def.name));
        }
    }

    let mut seen_roots = HashSet::new();
    for root in &schema.roots {
        if !seen_roots.insert(root.name.as_str()) {
            return Err(SchemaError::duplicate("root", &root.name));
        }
    }

    Ok(())
}

/// Checks that every root element references a defined type.
fn validate_roots(schema: &Schema) -> Result<(), SchemaError> {
    for root in &schema.roots {
        if !schema.has_type(&root.type_name) {
            return Err(SchemaError::TypeNotFound {
                name: root.type_name.clone(),
                referenced_by: root.name.clone(),
            });
        }
    }
    Ok(())
}

/// Validates a complex type definition.
fn validate_type(schema: &Schema, type_def: &ComplexTypeDef) -> Result<(), SchemaError> {
    let mut seen_fields = HashSet::new();
    let mut text_fields = 0;
    let mut element_fields = 0;

    for field in &type_def.fields {
        // Attributes and elements share one namespace in a record.
        if !seen_fields.insert(field.name.as_str()) {
            return Err(SchemaError::duplicate(
                "field",
                format!("{}/{}", type_def.name, field.name),
            ));
        }
        match field.node {
            NodeKind::Text => text_fields += 1,
            NodeKind::Element => element_fields += 1,
            NodeKind::Attribute => {}
        }
        validate_field(schema, type_def, field)?;
    }

    if text_fields > 1 {
        return Err(SchemaError::validation(format!(
            "type '{}' declares more than one text field",
            type_def.name
        )));
    }
    if text_fields == 1 && (element_fields > 0 || type_def.any_element.is_some()) {
        return Err(SchemaError::validation(format!(
            "type '{}' mixes character data with element content",
            type_def.name
        )));
    }

    if let Some(wildcard) = &type_def.any_element {
        validate_occurs(&format!("{}/any", type_def.name), wildcard.occurs)?;
    }

    Ok(())
}

/// Validates a single field definition.
fn validate_field(
    schema: &Schema,
    type_def: &ComplexTypeDef,
    field: &FieldDef,
) -> Result<(), SchemaError> {
    let path = format!("{}/{}", type_def.name, field.path_segment());

    validate_occurs(&path, field.occurs)?;
    validate_kind(schema, &path, &field.kind)?;

    match field.node {
        NodeKind::Attribute | NodeKind::Text => {
            if field.occurs.max.is_repeated() {
                return Err(SchemaError::validation(format!(
                    "'{path}' may occur at most once"
                )));
            }
            if !field.kind.is_simple() {
                return Err(SchemaError::validation(format!(
                    "'{path}' must have a simple kind, found {}",
                    field.kind
                )));
            }
        }
        NodeKind::Element => {}
    }

    if let FieldKind::Nested(_) = field.kind {
        if field.white_space != WhiteSpace::Preserve {
            return Err(SchemaError::validation(format!(
                "whiteSpace facet on '{path}' requires a simple kind"
            )));
        }
        if field.enumeration.is_some() {
            return Err(SchemaError::validation(format!(
                "enumeration on '{path}' requires a simple kind"
            )));
        }
    }

    if let Some(values) = &field.enumeration {
        for value in values {
            if !in_lexical_space(&field.kind, value) {
                return Err(SchemaError::InvalidEnumValue {
                    field: path.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Checks that `min` does not exceed `max`.
fn validate_occurs(path: &str, occurs: Occurs) -> Result<(), SchemaError> {
    match occurs.max {
        MaxOccurs::Bounded(max) if occurs.min > max => Err(SchemaError::InvalidOccurs {
            field: path.to_string(),
            min: occurs.min,
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a value kind and resolves nested type references.
fn validate_kind(schema: &Schema, path: &str, kind: &FieldKind) -> Result<(), SchemaError> {
    match kind {
        FieldKind::Integer(facets) => validate_facets(path, facets),
        FieldKind::Nested(type_name) => {
            if schema.has_type(type_name) {
                Ok(())
            } else {
                Err(SchemaError::TypeNotFound {
                    name: type_name.clone(),
                    referenced_by: path.to_string(),
                })
            }
        }
        FieldKind::List(item) => match item.as_ref() {
            FieldKind::Nested(_) | FieldKind::List(_) => Err(SchemaError::validation(format!(
                "list '{path}' must have simple items, found {item}"
            ))),
            item => validate_kind(schema, path, item),
        },
        FieldKind::Text | FieldKind::Boolean => Ok(()),
    }
}

/// Checks the digit ceiling of an integer kind.
fn validate_facets(path: &str, facets: &IntegerFacets) -> Result<(), SchemaError> {
    match facets.total_digits {
        Some(digits) if digits == 0 || digits > IntegerFacets::MAX_TOTAL_DIGITS => {
            Err(SchemaError::validation(format!(
                "totalDigits on '{path}' must be between 1 and {}, found {digits}",
                IntegerFacets::MAX_TOTAL_DIGITS
            )))
        }
        _ => Ok(()),
    }
}

/// Returns true if `value` is a valid literal of `kind`.
fn in_lexical_space(kind: &FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::Text => true,
        FieldKind::Integer(facets) => parse_bounded_integer(value, facets).is_ok(),
        FieldKind::Boolean => parse_boolean(value).is_some(),
        FieldKind::List(item) => split_list(value).all(|token| in_lexical_space(item, token)),
        FieldKind::Nested(_) => false,
    }
}

/// Rejects types whose required nested fields eventually require themselves.
///
/// Such a type has no finite instance, so neither a decoder nor a record
/// builder could ever satisfy it.
fn validate_required_nesting(schema: &Schema) -> Result<(), SchemaError> {
    let mut finished = HashSet::new();
    for type_def in &schema.types {
        let mut stack = Vec::new();
        visit_required(schema, &type_def.name, &mut stack, &mut finished)?;
    }
    Ok(())
}

fn visit_required<'a>(
    schema: &'a Schema,
    type_name: &'a str,
    stack: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), SchemaError> {
    if finished.contains(type_name) {
        return Ok(());
    }
    if let Some(start) = stack.iter().position(|&name| name == type_name) {
        let mut cycle: Vec<&str> = stack[start..].to_vec();
        cycle.push(type_name);
        return Err(SchemaError::CircularReference {
            path: cycle.join(" -> "),
        });
    }

    let Some(type_def) = schema.get_type(type_name) else {
        return Ok(());
    };

    stack.push(type_name);
    for field in type_def.elements().filter(|f| f.is_required()) {
        if let FieldKind::Nested(nested) = &field.kind {
            visit_required(schema, nested, stack, finished)?;
        }
    }
    stack.pop();
    finished.insert(type_name);

    Ok(())
}
