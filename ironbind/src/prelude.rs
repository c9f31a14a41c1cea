//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use ironbind::prelude::*;
//! ```

use std::path::Path;

// Value model
pub use ironbind_core::{
    Content, Document, ExtensionAttributes, ExtensionElement, FieldValue, QName, Record,
    ValidationError, XmlNode,
};

// Schema types
pub use ironbind_schema::{
    ComplexTypeDef, FieldDef, FieldKind, Form, ParseError, Schema, SchemaError, Wildcard,
    parse_schema, parse_schema_file,
};

// Codec types
pub use ironbind_codec::{
    Codec, CodecBuilder, CodecConfig, DecodeError, EncodeError, ForeignContent, TypedRecord,
    ValidationPolicy,
};

/// File loading for [`Codec`].
pub trait CodecExt: Sized {
    /// Reads a schema description file and creates a codec over it.
    ///
    /// # Errors
    /// Returns `SchemaError` if the file cannot be read or parsed, or the
    /// schema is inconsistent.
    fn from_schema_file(path: impl AsRef<Path>) -> Result<Self, SchemaError>;
}

impl CodecExt for Codec {
    fn from_schema_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        tracing::info!("Loading schema description from {}", path.display());
        Codec::new(parse_schema_file(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<bindingSchema name="signing" targetNamespace="urn:org:ebics:H004">
    <complexType name="HVUSigningInfoType">
        <attribute name="readyToBeSigned" type="boolean" use="required"/>
        <attribute name="NumSigRequired" type="positiveInteger" use="required"/>
    </complexType>
    <element name="HVUSigningInfo" type="HVUSigningInfoType"/>
</bindingSchema>"#;

    #[test]
    fn test_codec_from_schema_file() {
        let path = std::env::temp_dir().join(format!("ironbind-prelude-{}.xml", std::process::id()));
        std::fs::write(&path, SCHEMA).unwrap();
        let codec = Codec::from_schema_file(&path);
        std::fs::remove_file(&path).unwrap();

        let codec = codec.unwrap();
        let mut record = codec.new_record("HVUSigningInfoType").unwrap();
        codec.bind(&mut record).unwrap().set("NumSigRequired", 3).unwrap();
        let xml = codec.encode(&Document::new("HVUSigningInfo", record)).unwrap();
        assert!(String::from_utf8(xml).unwrap().ends_with(
            r#"<HVUSigningInfo xmlns="urn:org:ebics:H004" readyToBeSigned="false" NumSigRequired="3"/>"#
        ));
    }

    #[test]
    fn test_codec_from_missing_file() {
        let err = Codec::from_schema_file("/nonexistent/ironbind/schema.xml").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(ParseError::Io(_))));
    }
}
