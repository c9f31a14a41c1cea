//! Codec entry point and builder.

use crate::config::{CodecConfig, ForeignContent, ValidationPolicy};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{DecodeError, EncodeError};
use crate::typed::{TypedRecord, new_record};
use crate::validator::{validate_record, validate_record_all};
use ironbind_core::{Document, Record, ValidationError};
use ironbind_schema::{Schema, SchemaError, parse_schema, validate_schema};
use std::sync::Arc;

/// Schema-driven XML codec.
///
/// A codec is immutable once built and can be shared between threads;
/// every call works on its own buffers and value model.
#[derive(Debug, Clone)]
pub struct Codec {
    schema: Arc<Schema>,
    config: CodecConfig,
}

impl Codec {
    /// Creates a codec with the default configuration.
    ///
    /// # Errors
    /// Returns `SchemaError` if the schema is inconsistent.
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        Self::builder(schema).build()
    }

    /// Returns a builder for a codec over `schema`.
    #[must_use]
    pub fn builder(schema: impl Into<Arc<Schema>>) -> CodecBuilder {
        CodecBuilder::new(schema)
    }

    /// Parses a schema description and creates a codec over it.
    ///
    /// # Errors
    /// Returns `SchemaError` if the description cannot be parsed or is
    /// inconsistent.
    pub fn from_schema_str(xml: &str) -> Result<Self, SchemaError> {
        Self::new(parse_schema(xml)?)
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes a document.
    ///
    /// # Errors
    /// Returns the first structural or constraint violation; no partial
    /// document is produced.
    pub fn decode(&self, input: &[u8]) -> Result<Document, DecodeError> {
        Decoder::new(&self.schema, &self.config, input).decode()
    }

    /// Validates and encodes a document.
    ///
    /// # Errors
    /// Returns `EncodeError::Validation` if the document violates the schema.
    pub fn encode(&self, document: &Document) -> Result<Vec<u8>, EncodeError> {
        Encoder::new(&self.schema, &self.config).encode(document)
    }

    /// Creates an empty record of the named type.
    ///
    /// Required single booleans start as `false`.
    #[must_use]
    pub fn new_record(&self, type_name: &str) -> Option<Record> {
        self.schema.get_type(type_name).map(new_record)
    }

    /// Binds a record to its schema type for checked mutation.
    ///
    /// Returns `None` if the schema does not define the record's type.
    #[must_use]
    pub fn bind<'r>(&'r self, record: &'r mut Record) -> Option<TypedRecord<'r>> {
        let schema: &'r Schema = &self.schema;
        let type_def = schema.get_type(record.type_name())?;
        let path = schema
            .roots
            .iter()
            .find(|root| root.type_name == type_def.name)
            .map_or(type_def.name.as_str(), |root| root.name.as_str());
        Some(TypedRecord::new(
            schema,
            type_def,
            record,
            self.config.validation_policy,
            path,
        ))
    }

    /// Validates a document, stopping at the first violation.
    ///
    /// # Errors
    /// Returns the first violation. A root the schema does not declare is
    /// reported as `UnknownField`.
    pub fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        let (type_def, path) = self.root_type(document)?;
        validate_record(&self.schema, type_def, &document.record, path)
    }

    /// Validates a document and returns every violation.
    #[must_use]
    pub fn validate_all(&self, document: &Document) -> Vec<ValidationError> {
        match self.root_type(document) {
            Ok((type_def, path)) => validate_record_all(&self.schema, type_def, &document.record, path),
            Err(error) => vec![error],
        }
    }

    fn root_type<'d>(
        &self,
        document: &'d Document,
    ) -> Result<(&ironbind_schema::ComplexTypeDef, &'d str), ValidationError> {
        self.schema
            .get_root(&document.root)
            .and_then(|root| self.schema.get_type(&root.type_name))
            .map(|type_def| (type_def, document.root.as_str()))
            .ok_or_else(|| ValidationError::UnknownField {
                field: document.root.clone(),
                type_name: self.schema.name.clone(),
            })
    }
}

/// Builder for configuring and creating a codec.
#[derive(Debug)]
pub struct CodecBuilder {
    schema: Arc<Schema>,
    config: CodecConfig,
}

impl CodecBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            config: CodecConfig::default(),
        }
    }

    /// Sets the setter validation policy.
    #[must_use]
    pub fn validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.config.validation_policy = policy;
        self
    }

    /// Sets the handling of admitted foreign content.
    #[must_use]
    pub fn foreign_content(mut self, mode: ForeignContent) -> Self {
        self.config.foreign_content = mode;
        self
    }

    /// Sets the maximum nesting depth accepted by the decoder.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Sets whether encoded documents start with an XML declaration.
    #[must_use]
    pub fn xml_declaration(mut self, enabled: bool) -> Self {
        self.config.xml_declaration = enabled;
        self
    }

    /// Sets the indentation width of encoded documents.
    #[must_use]
    pub fn indent(mut self, width: usize) -> Self {
        self.config.indent = Some(width);
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the schema and builds the codec.
    ///
    /// # Errors
    /// Returns `SchemaError` if the schema is inconsistent.
    pub fn build(self) -> Result<Codec, SchemaError> {
        validate_schema(&self.schema)?;
        tracing::debug!(
            "Built codec for schema '{}' ({} types, {} roots)",
            self.schema.name,
            self.schema.types.len(),
            self.schema.roots.len()
        );
        Ok(Codec {
            schema: self.schema,
            config: self.config,
        })
    }
}
