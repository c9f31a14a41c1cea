//! # IronBind Core
//!
//! Core types for schema-driven XML data binding.
//!
//! This crate provides:
//! - The value model ([`Record`], [`FieldValue`], [`Document`])
//! - Extension content carriers for open attribute and element slots
//! - Lexical parsing and canonical rendering of field values
//! - Constraint facets and the value validation error taxonomy

pub mod error;
pub mod extension;
pub mod lexical;
pub mod types;
pub mod value;

pub use error::{Result, ValidationError};
pub use extension::{Content, ExtensionAttributes, ExtensionElement, QName, XmlNode};
pub use types::{IntegerFacets, MaxOccurs, NumericConstraint, Occurs, SignConstraint, WhiteSpace};
pub use value::{Document, FieldValue, Record};
