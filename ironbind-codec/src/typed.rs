//! Schema-aware mutable view of a record.
//!
//! A [`TypedRecord`] pairs a record with its complex type so that setters
//! can resolve field names and, under [`ValidationPolicy::OnWrite`], check
//! each value before storing it. Under [`ValidationPolicy::OnEncode`] the
//! same setters only resolve names; violations surface when the document is
//! validated or encoded.

use crate::config::ValidationPolicy;
use crate::validator::{field_path, item_path, validate_field, validate_item, validate_record};
use ironbind_core::{ExtensionElement, FieldValue, QName, Record, ValidationError};
use ironbind_schema::{ComplexTypeDef, FieldDef, FieldKind, NodeKind, Schema};

/// Creates an empty record of `type_def`.
///
/// Required single boolean fields start as `false`; every other field is
/// left unset.
#[must_use]
pub fn new_record(type_def: &ComplexTypeDef) -> Record {
    let mut record = Record::new(type_def.name.as_str());
    for field in &type_def.fields {
        if field.kind == FieldKind::Boolean && field.is_required() && !field.is_repeated() {
            record.set(field.name.as_str(), false);
        }
    }
    record
}

/// Mutable handle on a record bound to its schema type.
#[derive(Debug)]
pub struct TypedRecord<'r> {
    schema: &'r Schema,
    type_def: &'r ComplexTypeDef,
    record: &'r mut Record,
    policy: ValidationPolicy,
    path: String,
}

impl<'r> TypedRecord<'r> {
    pub(crate) fn new(
        schema: &'r Schema,
        type_def: &'r ComplexTypeDef,
        record: &'r mut Record,
        policy: ValidationPolicy,
        path: impl Into<String>,
    ) -> Self {
        Self {
            schema,
            type_def,
            record,
            policy,
            path: path.into(),
        }
    }

    /// Returns the schema type of the record.
    #[must_use]
    pub fn type_def(&self) -> &'r ComplexTypeDef {
        self.type_def
    }

    /// Returns the path used in error messages.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the underlying record.
    #[must_use]
    pub fn record(&self) -> &Record {
        self.record
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.record.get(name)
    }

    /// Stores a field value, returning the previous one.
    ///
    /// # Errors
    /// Returns `UnknownField` for names the type does not declare and, under
    /// `OnWrite`, the first violation of the new value.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<FieldValue>, ValidationError> {
        let field = self.field(name)?;
        let value = value.into();
        if self.checks() {
            validate_field(self.schema, field, &value, &field_path(&self.path, field))?;
        }
        Ok(self.record.set(name, value))
    }

    /// Appends one occurrence to a repeated element or one item to a list.
    ///
    /// # Errors
    /// Returns `TypeMismatch` if the field is neither repeated nor a list
    /// and, under `OnWrite`, a violation of the item or of `maxOccurs`.
    pub fn push(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ValidationError> {
        let field = self.field(name)?;
        let value = value.into();
        let path = field_path(&self.path, field);
        let count = self.record.sequence(name).len();

        if self.checks() {
            match &field.kind {
                _ if field.is_repeated() => {
                    check_room(field, count, &path)?;
                    validate_item(self.schema, field, &value, &item_path(&path, count))?;
                }
                FieldKind::List(_) => {
                    let single = FieldValue::Sequence(vec![value.clone()]);
                    validate_field(self.schema, field, &single, &path)
                        .map_err(|e| renumber(e, &path, count))?;
                }
                kind => {
                    return Err(ValidationError::mismatch(path, kind.to_string(), "sequence"));
                }
            }
        }

        self.record.sequence_mut(name).push(value);
        Ok(())
    }

    /// Clears a field, returning its value.
    ///
    /// # Errors
    /// Returns `UnknownField` for names the type does not declare.
    pub fn remove(&mut self, name: &str) -> Result<Option<FieldValue>, ValidationError> {
        self.field(name)?;
        Ok(self.record.remove(name))
    }

    /// Returns a handle on a single nested record, creating it if unset.
    ///
    /// # Errors
    /// Returns `TypeMismatch` if the field is not a single nested element or
    /// already holds a value of another kind.
    pub fn nested(&mut self, name: &str) -> Result<TypedRecord<'_>, ValidationError> {
        let field = self.field(name)?;
        let path = field_path(&self.path, field);
        let type_def = self.nested_type(field, &path)?;
        if field.is_repeated() {
            return Err(ValidationError::mismatch(path, "single record", "sequence"));
        }

        if !self.record.is_set(name) {
            self.record.set(name, new_record(type_def));
        }
        let found = self.record.get(name).map_or("nothing", FieldValue::kind_name);
        let record = match self.record.record_mut(name) {
            Some(record) => record,
            None => return Err(ValidationError::mismatch(path, field.kind.to_string(), found)),
        };
        Ok(TypedRecord::new(self.schema, type_def, record, self.policy, path))
    }

    /// Appends a new record to a repeated nested element and returns a
    /// handle on it.
    ///
    /// # Errors
    /// Returns `TypeMismatch` if the field is not a repeated nested element
    /// and, under `OnWrite`, `CardinalityViolation` if it is already full.
    pub fn push_record(&mut self, name: &str) -> Result<TypedRecord<'_>, ValidationError> {
        let field = self.field(name)?;
        let path = field_path(&self.path, field);
        let type_def = self.nested_type(field, &path)?;
        if !field.is_repeated() {
            return Err(ValidationError::mismatch(path, "sequence", "single record"));
        }

        let count = self.record.sequence(name).len();
        if self.checks() {
            check_room(field, count, &path)?;
        }

        let items = self.record.sequence_mut(name);
        items.push(FieldValue::Record(new_record(type_def)));
        let index = items.len() - 1;
        let record = items
            .last_mut()
            .and_then(FieldValue::as_record_mut)
            .ok_or_else(|| ValidationError::mismatch(path.as_str(), field.kind.to_string(), "nothing"))?;
        Ok(TypedRecord::new(
            self.schema,
            type_def,
            record,
            self.policy,
            item_path(&path, index),
        ))
    }

    /// Stores an extension attribute.
    ///
    /// # Errors
    /// Under `OnWrite`, returns `UnknownField` if the type has no attribute
    /// wildcard admitting the name or the name collides with a declared
    /// attribute.
    pub fn set_other_attribute(
        &mut self,
        name: QName,
        value: impl Into<String>,
    ) -> Result<Option<String>, ValidationError> {
        if self.checks() {
            let target = self.schema.target_namespace.as_deref();
            let admitted = self
                .type_def
                .any_attribute
                .as_ref()
                .is_some_and(|w| w.admits(name.namespace(), target));
            let declared = name.namespace().is_none()
                && self
                    .type_def
                    .field(&name.local)
                    .is_some_and(|f| f.node == NodeKind::Attribute);
            if !admitted || declared {
                return Err(self.unknown(format!("@{name}")));
            }
        }
        Ok(self.record.other_attributes_mut().insert(name, value))
    }

    /// Appends an extension element.
    ///
    /// # Errors
    /// Under `OnWrite`, returns `UnknownField` if the type's element
    /// wildcard does not admit the element and `CardinalityViolation` if the
    /// wildcard is already full.
    pub fn push_any(&mut self, element: ExtensionElement) -> Result<(), ValidationError> {
        if self.checks() {
            let target = self.schema.target_namespace.as_deref();
            let Some(wildcard) = self
                .type_def
                .any_element
                .as_ref()
                .filter(|w| w.admits(element.name.namespace(), target))
            else {
                return Err(self.unknown(element.name.to_string()));
            };
            let count = self.record.any().len() + 1;
            if !wildcard.occurs.max.admits(count) {
                return Err(ValidationError::cardinality(
                    format!("{}/any", self.path),
                    count,
                    wildcard.occurs,
                ));
            }
        }
        self.record.any_mut().push(element);
        Ok(())
    }

    /// Validates the whole record, including nested records.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_record(self.schema, self.type_def, self.record, &self.path)
    }

    fn checks(&self) -> bool {
        self.policy == ValidationPolicy::OnWrite
    }

    fn field(&self, name: &str) -> Result<&'r FieldDef, ValidationError> {
        let type_def: &'r ComplexTypeDef = self.type_def;
        type_def.field(name).ok_or_else(|| self.unknown(name))
    }

    fn nested_type(&self, field: &FieldDef, path: &str) -> Result<&'r ComplexTypeDef, ValidationError> {
        let schema: &'r Schema = self.schema;
        match &field.kind {
            FieldKind::Nested(type_name) => schema
                .get_type(type_name)
                .ok_or_else(|| ValidationError::mismatch(path, field.kind.to_string(), "undefined type")),
            kind => Err(ValidationError::mismatch(path, "record", kind.to_string())),
        }
    }

    fn unknown(&self, name: impl std::fmt::Display) -> ValidationError {
        ValidationError::UnknownField {
            field: format!("{}/{name}", self.path),
            type_name: self.type_def.name.clone(),
        }
    }
}

fn check_room(field: &FieldDef, count: usize, path: &str) -> Result<(), ValidationError> {
    if field.occurs.max.admits(count + 1) {
        Ok(())
    } else {
        Err(ValidationError::cardinality(path, count + 1, field.occurs))
    }
}

/// Rewrites the item index of a one-item list check to the real position.
fn renumber(error: ValidationError, path: &str, index: usize) -> ValidationError {
    let first = item_path(path, 0);
    let actual = item_path(path, index);
    match error {
        ValidationError::NumericRangeViolation {
            field,
            value,
            constraint,
        } if field == first => ValidationError::NumericRangeViolation {
            field: actual,
            value,
            constraint,
        },
        ValidationError::InvalidEnumValue { field, value } if field == first => {
            ValidationError::InvalidEnumValue {
                field: actual,
                value,
            }
        }
        ValidationError::TypeMismatch {
            field,
            expected,
            found,
        } if field == first => ValidationError::TypeMismatch {
            field: actual,
            expected,
            found,
        },
        ValidationError::InvalidLexicalForm {
            field,
            value,
            expected,
        } if field == first => ValidationError::InvalidLexicalForm {
            field: actual,
            value,
            expected,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EBICS_NS, keyresponse_schema};
    use ironbind_core::NumericConstraint;

    fn bind<'r>(schema: &'r Schema, record: &'r mut Record, policy: ValidationPolicy) -> TypedRecord<'r> {
        let type_def = schema.get_type(record.type_name()).unwrap();
        TypedRecord::new(schema, type_def, record, policy, "Root")
    }

    #[test]
    fn test_new_record_presets_required_booleans() {
        let schema = keyresponse_schema();
        let record = new_record(schema.get_type("HVTOrderFlagsType").unwrap());
        assert_eq!(record.boolean("completeOrderData"), Some(false));
        assert!(!record.is_set("fetchLimit"));
    }

    #[test]
    fn test_set_on_write_rejects_bad_values() {
        let schema = keyresponse_schema();
        let mut record = Record::new("HVTOrderFlagsType");
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnWrite);

        typed.set("fetchLimit", 9_999_999_999_i64).unwrap();
        let err = typed.set("fetchLimit", 10_000_000_000_i64).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NumericRangeViolation {
                constraint: NumericConstraint::TotalDigits(10),
                ..
            }
        ));
        assert!(matches!(
            typed.set("completeOrderData", "yes"),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            typed.set("fetchSize", 1),
            Err(ValidationError::UnknownField { .. })
        ));
        assert_eq!(typed.get("fetchLimit"), Some(&FieldValue::Integer(9_999_999_999)));
    }

    #[test]
    fn test_set_on_encode_defers_checks() {
        let schema = keyresponse_schema();
        let mut record = Record::new("HVTOrderFlagsType");
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnEncode);

        typed.set("fetchLimit", -1).unwrap();
        assert!(matches!(
            typed.validate(),
            Err(ValidationError::MissingRequiredField { .. })
                | Err(ValidationError::NumericRangeViolation { .. })
        ));
        assert!(typed.set("unknown", 1).is_err());
    }

    #[test]
    fn test_nested_and_push_record() {
        let schema = keyresponse_schema();
        let mut record = Record::new("UserInfoType");
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnWrite);

        {
            let mut user_id = typed.nested("UserID").unwrap();
            user_id.set("value", "USER0001").unwrap();
            user_id.set("Status", 1).unwrap();
            let err = user_id.set("Status", 9).unwrap_err();
            assert_eq!(err.field(), "Root/UserID/@Status");
        }
        {
            let mut permission = typed.push_record("Permission").unwrap();
            assert_eq!(permission.path(), "Root/Permission[1]");
            permission.push("OrderTypes", "HIA").unwrap();
            permission.push("OrderTypes", "HPB").unwrap();
            let err = permission.push("OrderTypes", "HKD HTD").unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidLexicalForm { ref field, expected: "list item", .. }
                    if field == "Root/Permission[1]/OrderTypes[3]"
            ));
            permission.set("AuthorisationLevel", "E").unwrap();
        }
        typed.push_record("Permission").unwrap();

        assert!(matches!(
            typed.nested("Permission"),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(typed.push("Name", "x"), Err(ValidationError::TypeMismatch { .. })));
        typed.validate().unwrap();

        assert_eq!(record.sequence("Permission").len(), 2);
        let first = record.sequence("Permission")[0].as_record().unwrap();
        assert_eq!(first.sequence("OrderTypes").len(), 2);
    }

    #[test]
    fn test_push_list_item_enumeration_path() {
        let schema = Schema::new("t")
            .with_type(ComplexTypeDef::new("T").with_field(
                FieldDef::element("Levels", FieldKind::list(FieldKind::Text))
                    .with_enumeration(["E", "A"]),
            ))
            .with_root("R", "T");
        let mut record = Record::new("T");
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnWrite);

        typed.push("Levels", "E").unwrap();
        let err = typed.push("Levels", "Z").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnumValue { ref field, .. } if field == "Root/Levels[2]"));
    }

    #[test]
    fn test_push_past_max_occurs() {
        let schema = Schema::new("t")
            .with_type(ComplexTypeDef::new("T").with_field(
                FieldDef::element("Code", FieldKind::Text).occurs(ironbind_core::Occurs::new(
                    0,
                    ironbind_core::MaxOccurs::Bounded(2),
                )),
            ))
            .with_root("R", "T");
        let mut record = Record::new("T");
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnWrite);

        typed.push("Code", "a").unwrap();
        typed.push("Code", "b").unwrap();
        assert!(matches!(
            typed.push("Code", "c"),
            Err(ValidationError::CardinalityViolation { actual: 3, .. })
        ));
    }

    #[test]
    fn test_extension_setters() {
        let schema = keyresponse_schema();
        let mut record = new_record(schema.get_type("UserInfoType").unwrap());
        let mut typed = bind(&schema, &mut record, ValidationPolicy::OnWrite);

        typed
            .push_any(ExtensionElement::new(QName::new("urn:vendor", "Audit")))
            .unwrap();
        assert!(matches!(
            typed.push_any(ExtensionElement::new(QName::new(EBICS_NS, "Audit"))),
            Err(ValidationError::UnknownField { .. })
        ));
        assert!(matches!(
            typed.set_other_attribute(QName::new("urn:vendor", "flag"), "1"),
            Err(ValidationError::UnknownField { .. })
        ));

        let mut flags = new_record(schema.get_type("HVTOrderFlagsType").unwrap());
        let mut typed = bind(&schema, &mut flags, ValidationPolicy::OnWrite);
        typed.set_other_attribute(QName::new(EBICS_NS, "Hint"), "x").unwrap();
        assert_eq!(flags.other_attributes().get(&QName::new(EBICS_NS, "Hint")), Some("x"));
    }
}
