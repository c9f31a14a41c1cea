//! # IronBind
//!
//! Schema-driven XML data binding for Rust.
//!
//! IronBind maps documents of a fixed XML schema family, such as the EBICS
//! key management and order data responses, onto typed records and back,
//! enforcing the schema's constraints in both directions.
//!
//! ## Features
//!
//! - **Typed records** - Field access by kind with checked setters
//! - **Constraint validation** - Cardinality, digit ceilings, sign rules and enumerations
//! - **Open content** - Wildcard attributes and elements are captured and re-emitted
//! - **Canonical output** - Decoding accepts the full lexical space, encoding is canonical
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironbind::prelude::*;
//!
//! let codec = Codec::from_schema_file("schemas/keyresponse.xml")?;
//! let document = codec.decode(xml.as_bytes())?;
//! let user = document.record.record("UserInfo").unwrap();
//!
//! let mut record = codec.new_record("HVTOrderFlagsType").unwrap();
//! codec.bind(&mut record).unwrap().set("fetchLimit", 100)?;
//! let bytes = codec.encode(&Document::new("HVTOrderFlags", record))?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Value model, extension carriers, lexical forms
//! - [`schema`] - Schema description types, parsing and validation
//! - [`codec`] - Decoder, encoder, validator and typed handles

pub mod prelude;

/// Value model, extension carriers and constraint primitives.
pub mod core {
    pub use ironbind_core::*;
}

/// Schema description parsing and validation.
pub mod schema {
    pub use ironbind_schema::*;
}

/// Decoding, encoding and constraint validation.
pub mod codec {
    pub use ironbind_codec::*;
}

// Re-export commonly used items at the crate root
pub use ironbind_codec::{Codec, CodecBuilder, CodecConfig, DecodeError, EncodeError, TypedRecord};
pub use ironbind_core::{Document, FieldValue, Record, ValidationError};
pub use ironbind_schema::{Schema, SchemaError};
pub use prelude::CodecExt;
