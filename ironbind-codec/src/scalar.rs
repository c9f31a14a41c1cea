//! Mapping between character data and simple field values.

use ironbind_core::lexical::{
    apply_white_space, format_boolean, format_integer, join_list, parse_boolean,
    parse_bounded_integer, split_list,
};
use ironbind_core::{FieldValue, NumericConstraint, ValidationError, WhiteSpace};
use ironbind_schema::FieldKind;

/// Parses character data into a value of `kind`.
///
/// The whitespace facet is applied first. Lists are split on whitespace and
/// each item parsed with the item kind; list items are reported as
/// `path[n]`, counting from 1.
///
/// # Errors
/// Returns `InvalidLexicalForm` for text outside the lexical space of the
/// kind and `NumericRangeViolation` for integers breaking their facets.
pub fn parse_value(
    kind: &FieldKind,
    white_space: WhiteSpace,
    text: &str,
    path: &str,
) -> Result<FieldValue, ValidationError> {
    let text = apply_white_space(text, white_space);
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(text.into_owned())),
        FieldKind::Integer(facets) => match parse_bounded_integer(&text, facets) {
            Ok(value) => Ok(FieldValue::Integer(value)),
            Err(NumericConstraint::NotAnInteger) => Err(ValidationError::InvalidLexicalForm {
                field: path.to_string(),
                value: text.into_owned(),
                expected: "integer",
            }),
            Err(constraint) => Err(ValidationError::numeric(path, text.trim(), constraint)),
        },
        FieldKind::Boolean => {
            parse_boolean(&text)
                .map(FieldValue::Boolean)
                .ok_or_else(|| ValidationError::InvalidLexicalForm {
                    field: path.to_string(),
                    value: text.into_owned(),
                    expected: "boolean",
                })
        }
        FieldKind::List(item) => split_list(&text)
            .enumerate()
            .map(|(i, token)| {
                parse_value(item, WhiteSpace::Preserve, token, &format!("{path}[{}]", i + 1))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Sequence),
        FieldKind::Nested(type_name) => Err(ValidationError::mismatch(
            path,
            format!("record of type '{type_name}'"),
            "text",
        )),
    }
}

/// Renders a simple value in canonical form.
///
/// Returns `None` when the value variant does not fit `kind`; callers
/// validate before formatting.
#[must_use]
pub fn format_value(kind: &FieldKind, white_space: WhiteSpace, value: &FieldValue) -> Option<String> {
    match (kind, value) {
        (FieldKind::Text, FieldValue::Text(text)) => {
            Some(apply_white_space(text, white_space).into_owned())
        }
        (FieldKind::Integer(_), FieldValue::Integer(value)) => Some(format_integer(*value)),
        (FieldKind::Boolean, FieldValue::Boolean(value)) => Some(format_boolean(*value).to_string()),
        (FieldKind::List(item), FieldValue::Sequence(items)) => {
            let tokens = items
                .iter()
                .map(|v| format_value(item, WhiteSpace::Collapse, v))
                .collect::<Option<Vec<_>>>()?;
            Some(join_list(tokens.iter().map(String::as_str)))
        }
        _ => None,
    }
}

/// Canonical form of an enumeration literal, or `None` if it is not a
/// literal of `kind`.
#[must_use]
pub fn canonical_literal(kind: &FieldKind, white_space: WhiteSpace, literal: &str) -> Option<String> {
    match kind {
        FieldKind::Text => Some(apply_white_space(literal, white_space).into_owned()),
        FieldKind::Integer(_) => ironbind_core::lexical::parse_integer(literal)
            .ok()
            .map(format_integer),
        FieldKind::Boolean => parse_boolean(literal).map(|b| format_boolean(b).to_string()),
        FieldKind::List(item) => canonical_literal(item, WhiteSpace::Collapse, literal),
        FieldKind::Nested(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironbind_core::SignConstraint;

    fn fetch_limit() -> FieldKind {
        FieldKind::integer(Some(10), SignConstraint::NonNegative)
    }

    #[test]
    fn test_parse_integer_lexical_space() {
        let kind = fetch_limit();
        assert_eq!(
            parse_value(&kind, WhiteSpace::Collapse, " +0042 ", "f").unwrap(),
            FieldValue::Integer(42)
        );
        assert_eq!(
            parse_value(&kind, WhiteSpace::Collapse, "9999999999", "f").unwrap(),
            FieldValue::Integer(9_999_999_999)
        );
    }

    #[test]
    fn test_parse_integer_violations() {
        let kind = fetch_limit();
        assert!(matches!(
            parse_value(&kind, WhiteSpace::Collapse, "10000000000", "f"),
            Err(ValidationError::NumericRangeViolation {
                constraint: NumericConstraint::TotalDigits(10),
                ..
            })
        ));
        assert!(matches!(
            parse_value(&kind, WhiteSpace::Collapse, "-1", "f"),
            Err(ValidationError::NumericRangeViolation {
                constraint: NumericConstraint::NonNegative,
                ..
            })
        ));
        assert!(matches!(
            parse_value(&kind, WhiteSpace::Collapse, "12a", "f"),
            Err(ValidationError::InvalidLexicalForm { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_parse_boolean_literals() {
        assert_eq!(
            parse_value(&FieldKind::Boolean, WhiteSpace::Collapse, "1", "f").unwrap(),
            FieldValue::Boolean(true)
        );
        assert!(matches!(
            parse_value(&FieldKind::Boolean, WhiteSpace::Collapse, "yes", "f"),
            Err(ValidationError::InvalidLexicalForm { expected: "boolean", .. })
        ));
    }

    #[test]
    fn test_parse_list_reports_item_path() {
        let kind = FieldKind::list(FieldKind::integer(None, SignConstraint::Positive));
        let err = parse_value(&kind, WhiteSpace::Collapse, "1 2 0", "T/Counts").unwrap_err();
        assert_eq!(err.field(), "T/Counts[3]");

        let kind = FieldKind::list(FieldKind::Text);
        assert_eq!(
            parse_value(&kind, WhiteSpace::Collapse, "  HIA\n HPB  INI ", "T/OrderTypes").unwrap(),
            FieldValue::Sequence(vec!["HIA".into(), "HPB".into(), "INI".into()])
        );
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(
            format_value(&fetch_limit(), WhiteSpace::Collapse, &FieldValue::Integer(42)),
            Some("42".to_string())
        );
        assert_eq!(
            format_value(&FieldKind::Boolean, WhiteSpace::Collapse, &FieldValue::Boolean(true)),
            Some("true".to_string())
        );
        assert_eq!(
            format_value(
                &FieldKind::Text,
                WhiteSpace::Replace,
                &FieldValue::Text("a\tb".to_string())
            ),
            Some("a b".to_string())
        );
        assert_eq!(
            format_value(&FieldKind::Boolean, WhiteSpace::Collapse, &FieldValue::Integer(1)),
            None
        );
    }

    #[test]
    fn test_canonical_literal() {
        assert_eq!(
            canonical_literal(&fetch_limit(), WhiteSpace::Collapse, "007"),
            Some("7".to_string())
        );
        assert_eq!(
            canonical_literal(&FieldKind::Boolean, WhiteSpace::Collapse, "0"),
            Some("false".to_string())
        );
    }
}
