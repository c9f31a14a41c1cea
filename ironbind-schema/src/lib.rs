//! # IronBind Schema
//!
//! Binding schema description types, parser and validation.
//!
//! This crate provides:
//! - Type definitions for complex types, fields and open content wildcards
//! - Parsing of binding schema description documents
//! - Schema consistency validation

pub mod error;
pub mod parser;
pub mod types;
pub mod validation;

pub use error::{ParseError, SchemaError};
pub use parser::{parse_schema, parse_schema_file};
pub use types::{
    ComplexTypeDef, FieldDef, FieldKind, Form, NamespaceConstraint, NamespaceToken, NodeKind,
    ProcessContents, RootElement, Schema, Wildcard,
};
pub use validation::validate_schema;
