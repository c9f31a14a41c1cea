//! Error types for schema parsing and validation.

use thiserror::Error;

/// Error type for schema parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute syntax.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Unknown element encountered.
    #[error("unknown element '{element}' in context '{context}'")]
    UnknownElement {
        /// Element name.
        element: String,
        /// Parent context.
        context: String,
    },

    /// Invalid schema structure.
    #[error("invalid schema structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for schema validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Type not found.
    #[error("type '{name}' referenced by '{referenced_by}' not found")]
    TypeNotFound {
        /// Type name.
        name: String,
        /// Field or root referencing the type.
        referenced_by: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} definition: '{name}'")]
    DuplicateDefinition {
        /// Kind of definition (type, field, root).
        kind: String,
        /// Name of the duplicate.
        name: String,
    },

    /// Occurrence range with minimum above maximum.
    #[error("invalid occurrence range on '{field}': minOccurs {min} exceeds maxOccurs {max}")]
    InvalidOccurs {
        /// Field path.
        field: String,
        /// Declared minimum.
        min: u32,
        /// Declared maximum.
        max: u32,
    },

    /// Circular chain of required nested types.
    #[error("circular type reference detected: {path}")]
    CircularReference {
        /// Path of the circular reference.
        path: String,
    },

    /// Invalid enumeration value.
    #[error("invalid enumeration value '{value}' on field '{field}'")]
    InvalidEnumValue {
        /// Field path.
        field: String,
        /// Invalid value.
        value: String,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown element error.
    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }
}

impl SchemaError {
    /// Creates a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a generic validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
