//! In-memory value model of schema-typed XML content.
//!
//! A [`Record`] holds the values of one complex type instance keyed by field
//! name, together with its extension content. The model is a strict tree:
//! every record exclusively owns its nested records and sequences.
//!
//! Records are not synchronized. Sharing one between threads for mutation
//! requires external locking.

use crate::extension::{ExtensionAttributes, ExtensionElement};

/// Value of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Character data.
    Text(String),
    /// Integer value.
    Integer(i128),
    /// Boolean value.
    Boolean(bool),
    /// Nested complex type instance.
    Record(Record),
    /// Repeated occurrences or list items, in order.
    Sequence(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns a short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Record(_) => "record",
            Self::Sequence(_) => "sequence",
        }
    }

    /// Returns the text value, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the nested record, if this is a record.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the nested record mutably, if this is a record.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the items, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<i128> for FieldValue {
    fn from(value: i128) -> Self {
        Self::Integer(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::Sequence(value)
    }
}

/// Instance of a complex type.
///
/// Fields are keyed by their declared XML name. Serialization order comes
/// from the schema, not from this map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    type_name: String,
    fields: std::collections::BTreeMap<String, FieldValue>,
    other_attributes: ExtensionAttributes,
    any: Vec<ExtensionElement>,
}

impl Record {
    /// Creates an empty record of the named type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Returns the schema type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Looks up a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Looks up a field value mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    /// Stores a field value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style variant of [`Record::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Clears a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns true if the field holds a value.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns a text field.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Returns an integer field.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i128> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    /// Returns a boolean field.
    ///
    /// `None` means unset, which is distinct from `false`.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_boolean)
    }

    /// Returns a nested record field.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(FieldValue::as_record)
    }

    /// Returns a nested record field mutably.
    pub fn record_mut(&mut self, name: &str) -> Option<&mut Record> {
        self.get_mut(name).and_then(FieldValue::as_record_mut)
    }

    /// Returns the items of a sequence field, empty when unset.
    #[must_use]
    pub fn sequence(&self, name: &str) -> &[FieldValue] {
        self.get(name).and_then(FieldValue::as_sequence).unwrap_or(&[])
    }

    /// Returns the live sequence of a field.
    ///
    /// The sequence is created empty when the field is unset, and a single
    /// value already stored is turned into a one-item sequence. Pushing onto
    /// the returned vector mutates this record; there is no separate setter.
    pub fn sequence_mut(&mut self, name: &str) -> &mut Vec<FieldValue> {
        let slot = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Sequence(Vec::new()));
        if !matches!(slot, FieldValue::Sequence(_)) {
            let single = std::mem::replace(slot, FieldValue::Sequence(Vec::new()));
            *slot = FieldValue::Sequence(vec![single]);
        }
        let FieldValue::Sequence(items) = slot else {
            unreachable!("slot normalized to a sequence above")
        };
        items
    }

    /// Iterates stored fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field and no extension content is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.other_attributes.is_empty() && self.any.is_empty()
    }

    /// Attributes captured by the type's attribute wildcard.
    #[must_use]
    pub fn other_attributes(&self) -> &ExtensionAttributes {
        &self.other_attributes
    }

    /// Live map of wildcard attributes.
    pub fn other_attributes_mut(&mut self) -> &mut ExtensionAttributes {
        &mut self.other_attributes
    }

    /// Elements captured by the type's trailing element wildcard.
    #[must_use]
    pub fn any(&self) -> &[ExtensionElement] {
        &self.any
    }

    /// Live sequence of wildcard elements.
    pub fn any_mut(&mut self) -> &mut Vec<ExtensionElement> {
        &mut self.any
    }
}

/// A decoded or to-be-encoded XML document: root element name and its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Local name of the root element.
    pub root: String,
    /// Content of the root element.
    pub record: Record,
}

impl Document {
    /// Creates a document.
    #[must_use]
    pub fn new(root: impl Into<String>, record: Record) -> Self {
        Self {
            root: root.into(),
            record,
        }
    }
}
