//! Error types for value-level constraint checks.

use crate::types::{NumericConstraint, Occurs};
use thiserror::Error;

/// A field value violating its declared constraints.
///
/// Every variant names the offending field by its path from the document
/// root, e.g. `UserInfo/Permission[1]/@AuthorisationLevel`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field has no value.
    #[error("missing required field '{field}'")]
    MissingRequiredField {
        /// Field path.
        field: String,
    },

    /// Occurrence count outside the declared range.
    #[error("field '{field}' occurs {actual} times, allowed {allowed}")]
    CardinalityViolation {
        /// Field path.
        field: String,
        /// Number of occurrences found.
        actual: usize,
        /// Declared occurrence range.
        allowed: Occurs,
    },

    /// Integer outside its digit ceiling or sign restriction.
    #[error("value '{value}' of field '{field}' violates constraint: {constraint}")]
    NumericRangeViolation {
        /// Field path.
        field: String,
        /// Offending value as text.
        value: String,
        /// Violated constraint.
        constraint: NumericConstraint,
    },

    /// Value outside the declared enumeration.
    #[error("value '{value}' is not in the enumeration of field '{field}'")]
    InvalidEnumValue {
        /// Field path.
        field: String,
        /// Offending value as text.
        value: String,
    },

    /// Text that is not a literal of the field's kind.
    #[error("invalid {expected} literal '{value}' for field '{field}'")]
    InvalidLexicalForm {
        /// Field path.
        field: String,
        /// Offending text.
        value: String,
        /// Expected kind.
        expected: &'static str,
    },

    /// Value variant or nested type does not match the declaration.
    #[error("field '{field}' expects {expected}, found {found}")]
    TypeMismatch {
        /// Field path.
        field: String,
        /// Declared kind or type.
        expected: String,
        /// Kind or type found.
        found: String,
    },

    /// Value stored under a name the type does not declare.
    #[error("field '{field}' is not declared on type '{type_name}'")]
    UnknownField {
        /// Field path.
        field: String,
        /// Owning type name.
        type_name: String,
    },
}

impl ValidationError {
    /// Returns the path of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequiredField { field }
            | Self::CardinalityViolation { field, .. }
            | Self::NumericRangeViolation { field, .. }
            | Self::InvalidEnumValue { field, .. }
            | Self::InvalidLexicalForm { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::UnknownField { field, .. } => field,
        }
    }

    /// Creates a missing required field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Creates a cardinality error.
    pub fn cardinality(field: impl Into<String>, actual: usize, allowed: Occurs) -> Self {
        Self::CardinalityViolation {
            field: field.into(),
            actual,
            allowed,
        }
    }

    /// Creates a numeric range error.
    pub fn numeric(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: NumericConstraint,
    ) -> Self {
        Self::NumericRangeViolation {
            field: field.into(),
            value: value.into(),
            constraint,
        }
    }

    /// Creates a type mismatch error.
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type alias for value-level checks.
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaxOccurs;

    #[test]
    fn test_error_display() {
        let err = ValidationError::numeric(
            "HVTOrderFlags/@fetchLimit",
            "10000000000",
            NumericConstraint::TotalDigits(10),
        );
        assert_eq!(
            err.to_string(),
            "value '10000000000' of field 'HVTOrderFlags/@fetchLimit' violates constraint: at most 10 digits"
        );

        let err = ValidationError::cardinality("UserInfo/Permission", 0, Occurs::new(1, MaxOccurs::Unbounded));
        assert_eq!(
            err.to_string(),
            "field 'UserInfo/Permission' occurs 0 times, allowed 1..unbounded"
        );
    }

    #[test]
    fn test_error_field_accessor() {
        assert_eq!(ValidationError::missing("A/B").field(), "A/B");
        assert_eq!(ValidationError::mismatch("A/@c", "boolean", "text").field(), "A/@c");
    }
}
