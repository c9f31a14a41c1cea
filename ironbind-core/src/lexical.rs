//! Lexical and canonical text forms of field values.
//!
//! Decoding accepts the full lexical space of each kind (leading zeros,
//! explicit `+`, `1`/`0` booleans); encoding always produces the single
//! canonical form.

use crate::types::{IntegerFacets, NumericConstraint, WhiteSpace};
use std::borrow::Cow;

/// Parses an integer literal.
///
/// Surrounding whitespace is ignored, one leading sign is accepted and
/// leading zeros are dropped.
///
/// # Errors
/// Returns [`NumericConstraint::NotAnInteger`] for anything that is not an
/// integer literal and [`NumericConstraint::Overflow`] when the value does
/// not fit in an `i128`.
pub fn parse_integer(text: &str) -> Result<i128, NumericConstraint> {
    let text = text.trim_matches(is_xml_whitespace);
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NumericConstraint::NotAnInteger);
    }

    let mut value: i128 = 0;
    for b in digits.bytes() {
        let digit = i128::from(b - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| {
                if negative {
                    v.checked_sub(digit)
                } else {
                    v.checked_add(digit)
                }
            })
            .ok_or(NumericConstraint::Overflow)?;
    }
    Ok(value)
}

/// Parses an integer literal and checks it against `facets`.
///
/// A literal too large to represent is reported as a digit-ceiling violation
/// when the facets carry one, since it necessarily exceeds it.
///
/// # Errors
/// Returns the violated [`NumericConstraint`].
pub fn parse_bounded_integer(text: &str, facets: &IntegerFacets) -> Result<i128, NumericConstraint> {
    match parse_integer(text) {
        Ok(value) => facets.check(value).map(|()| value),
        Err(NumericConstraint::Overflow) => Err(facets
            .total_digits
            .map_or(NumericConstraint::Overflow, NumericConstraint::TotalDigits)),
        Err(e) => Err(e),
    }
}

/// Renders an integer in canonical form.
#[must_use]
pub fn format_integer(value: i128) -> String {
    value.to_string()
}

/// Parses an `xs:boolean` literal.
#[must_use]
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim_matches(is_xml_whitespace) {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Renders a boolean in canonical form.
#[must_use]
pub const fn format_boolean(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// XML whitespace: space, tab, line feed and carriage return.
#[must_use]
pub const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Applies a whitespace facet to `text`.
#[must_use]
pub fn apply_white_space(text: &str, white_space: WhiteSpace) -> Cow<'_, str> {
    match white_space {
        WhiteSpace::Preserve => Cow::Borrowed(text),
        WhiteSpace::Replace => {
            if text.contains(['\t', '\n', '\r']) {
                Cow::Owned(text.replace(['\t', '\n', '\r'], " "))
            } else {
                Cow::Borrowed(text)
            }
        }
        WhiteSpace::Collapse => {
            let collapsed = join_list(split_list(text));
            if collapsed == text {
                Cow::Borrowed(text)
            } else {
                Cow::Owned(collapsed)
            }
        }
    }
}

/// Splits an `xs:list` value into its items.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_xml_whitespace).filter(|item| !item.is_empty())
}

/// Joins list items with single spaces.
#[must_use]
pub fn join_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(" ")
}
