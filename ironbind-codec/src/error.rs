//! Error types for decoding and encoding documents.

use ironbind_core::ValidationError;
use thiserror::Error;

/// Error type for decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A field value violates its declared constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Element not allowed at this position.
    #[error("unexpected element '{tag}' at '{path}', expected {expected}")]
    UnexpectedElement {
        /// Path of the parent element.
        path: String,
        /// Local name of the offending element.
        tag: String,
        /// What the type allows at this position.
        expected: String,
    },

    /// Attribute not declared on the type and not admitted by its wildcard.
    #[error("unexpected attribute '{name}' at '{path}'")]
    UnexpectedAttribute {
        /// Path of the owning element.
        path: String,
        /// Attribute name.
        name: String,
    },

    /// Character data inside element-only content.
    #[error("unexpected character data at '{path}'")]
    UnexpectedText {
        /// Path of the owning element.
        path: String,
    },

    /// Content in a namespace the type does not admit.
    #[error("'{name}' at '{path}' is in namespace '{namespace}', which is not admitted here")]
    UnknownNamespace {
        /// Path of the owning element.
        path: String,
        /// Local name of the element or attribute.
        name: String,
        /// Namespace URI of the offending content.
        namespace: String,
    },

    /// Input is not well-formed XML.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Error message.
        message: String,
    },

    /// Reference to a type the schema does not define.
    #[error("type '{name}' is not defined by the schema")]
    UnknownType {
        /// Type name.
        name: String,
    },

    /// Element nesting exceeds the configured limit.
    #[error("nesting deeper than {max_depth} levels at '{path}'")]
    NestingTooDeep {
        /// Path of the element that exceeded the limit.
        path: String,
        /// Configured limit.
        max_depth: usize,
    },
}

impl DecodeError {
    /// Creates a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Creates an unexpected element error.
    pub fn unexpected_element(
        path: impl Into<String>,
        tag: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::UnexpectedElement {
            path: path.into(),
            tag: tag.into(),
            expected: expected.into(),
        }
    }

    /// Creates an unknown namespace error.
    pub fn unknown_namespace(
        path: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::UnknownNamespace {
            path: path.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl From<quick_xml::Error> for DecodeError {
    fn from(e: quick_xml::Error) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for DecodeError {
    fn from(e: quick_xml::escape::EscapeError) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::malformed(e.to_string())
    }
}

/// Error type for encoding operations.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The document violates the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document root is not a global element of the schema.
    #[error("'{name}' is not a root element of the schema")]
    UnknownRoot {
        /// Root element name.
        name: String,
    },

    /// Reference to a type the schema does not define.
    #[error("type '{name}' is not defined by the schema")]
    UnknownType {
        /// Type name.
        name: String,
    },

    /// Writer error.
    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type alias for encoding.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
