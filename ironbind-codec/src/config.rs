//! Codec configuration.

/// When typed setters check the values they store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationPolicy {
    /// Setters validate the new value and reject it immediately.
    #[default]
    OnWrite,
    /// Setters store anything; violations surface when the document is encoded.
    OnEncode,
}

/// What the decoder does with content admitted by an open content slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForeignContent {
    /// Keep it in the record's extension carrier.
    #[default]
    Capture,
    /// Fail with `UnknownNamespace` when it is in a foreign namespace.
    Reject,
}

/// Codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Setter validation policy.
    pub validation_policy: ValidationPolicy,
    /// Handling of admitted foreign content.
    pub foreign_content: ForeignContent,
    /// Maximum element nesting depth accepted by the decoder.
    pub max_depth: usize,
    /// Whether encoded documents start with an XML declaration.
    pub xml_declaration: bool,
    /// Indentation width for encoded documents, `None` for compact output.
    pub indent: Option<usize>,
}

impl CodecConfig {
    /// Default maximum nesting depth.
    pub const DEFAULT_MAX_DEPTH: usize = 64;
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            validation_policy: ValidationPolicy::default(),
            foreign_content: ForeignContent::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
            xml_declaration: true,
            indent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.validation_policy, ValidationPolicy::OnWrite);
        assert_eq!(config.foreign_content, ForeignContent::Capture);
        assert_eq!(config.max_depth, 64);
        assert!(config.xml_declaration);
        assert_eq!(config.indent, None);
    }
}
