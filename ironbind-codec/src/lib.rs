//! # IronBind Codec
//!
//! Schema-driven XML decoding, encoding and constraint validation.
//!
//! This crate provides:
//! - [`Codec`], which decodes documents into [`ironbind_core::Record`] trees
//!   and encodes them back in canonical form
//! - The constraint validator, in fail-fast and collect-all modes
//! - [`TypedRecord`], a schema-aware handle with checked setters
//! - Capture and re-emission of open content admitted by type wildcards
//!
//! ```ignore
//! use ironbind_codec::Codec;
//!
//! let codec = Codec::from_schema_str(SCHEMA)?;
//! let document = codec.decode(xml.as_bytes())?;
//! let user = document.record.record("UserInfo").unwrap();
//! println!("{:?}", user.record("UserID").and_then(|id| id.text("value")));
//! let bytes = codec.encode(&document)?;
//! ```

pub mod codec;
pub mod config;
mod decoder;
mod encoder;
pub mod error;
pub mod scalar;
pub mod typed;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{Codec, CodecBuilder};
pub use config::{CodecConfig, ForeignContent, ValidationPolicy};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use scalar::{format_value, parse_value};
pub use typed::{TypedRecord, new_record};
pub use validator::{validate_field, validate_item, validate_record, validate_record_all};
