//! Message view over JSON values checked against a schema.

use serde_json::Value;

use super::elements::{FieldKind, FieldType, MessageType, Schema};
use super::validation::{validate_message, SchemaError};
use crate::fieldmask::FieldKey;
use crate::message::{well_known, FieldValue, Message};

static NULL: Value = Value::Null;

/// TypedMessage is a JSON value read as an instance of a schema message type.
///
/// Absent and `null` fields are unset. A field holds its default value when it
/// is unset, `""`, `0`, `false`, an empty array or object, or a message whose
/// fields all hold their defaults. Unset message fields are never descended
/// into.
#[derive(Debug, Clone, Copy)]
pub struct TypedMessage<'a> {
    schema: &'a Schema,
    message_type: &'a MessageType,
    value: &'a Value,
}

impl<'a> TypedMessage<'a> {
    /// Creates a typed view of `value` after checking it against `type_name`.
    pub fn new(schema: &'a Schema, type_name: &str, value: &'a Value) -> Result<Self, SchemaError> {
        let message_type = schema
            .find_message(type_name)
            .ok_or_else(|| SchemaError::unknown_type("", type_name))?;
        validate_message(schema, message_type, value, "")?;
        Ok(TypedMessage {
            schema,
            message_type,
            value,
        })
    }

    /// Returns the message type of this view.
    pub fn message_type(&self) -> &'a MessageType {
        self.message_type
    }

    /// Returns the raw value of a field; unset fields are `null`.
    pub fn get(&self, name: &str) -> &'a Value {
        self.value.get(name).unwrap_or(&NULL)
    }

    fn nested(&self, message_type: &'a MessageType, value: &'a Value) -> TypedMessage<'a> {
        TypedMessage {
            schema: self.schema,
            message_type,
            value,
        }
    }

    /// Wraps a value of the given type for the reset mask walk.
    fn field_value(&self, field_type: &'a FieldType, value: &'a Value) -> FieldValue<'a> {
        let Ok(kind) = field_type.kind("") else {
            return FieldValue::Scalar;
        };
        match kind {
            FieldKind::Scalar(_) => FieldValue::Scalar,
            // An unset message is reset as a whole.
            FieldKind::Message(_) if value.is_null() => FieldValue::Scalar,
            FieldKind::Message(name) => match self.schema.find_message(name) {
                Some(message_type) => FieldValue::Message(Box::new(self.nested(message_type, value))),
                None => FieldValue::Scalar,
            },
            FieldKind::Repeated(element) => FieldValue::Repeated(
                value
                    .as_array()
                    .map(|items| items.iter().map(|v| self.field_value(element, v)).collect())
                    .unwrap_or_default(),
            ),
            FieldKind::Map(element) => FieldValue::Map(
                value
                    .as_object()
                    .map(|entries| entries.values().map(|v| self.field_value(element, v)).collect())
                    .unwrap_or_default(),
            ),
            FieldKind::WellKnown(name) => {
                FieldValue::Masked(well_known::mask_for(name).unwrap_or_default())
            }
        }
    }

    fn is_default_value(&self, field_type: &'a FieldType, value: &'a Value) -> bool {
        if value.is_null() {
            return true;
        }
        match field_type.kind("") {
            Ok(FieldKind::Message(name)) => match self.schema.find_message(name) {
                Some(message_type) => {
                    let nested = self.nested(message_type, value);
                    message_type
                        .fields
                        .iter()
                        .all(|f| nested.is_default_value(&f.field_type, nested.get(&f.name)))
                }
                None => is_zero(value),
            },
            _ => is_zero(value),
        }
    }
}

impl Message for TypedMessage<'_> {
    fn declared_fields(&self) -> Vec<FieldKey> {
        self.message_type
            .fields
            .iter()
            .map(|f| FieldKey::new(f.name.as_str()))
            .collect()
    }

    fn field(&self, name: &FieldKey) -> FieldValue<'_> {
        match self.message_type.find_field(name.as_str()) {
            Some(def) => self.field_value(&def.field_type, self.get(name.as_str())),
            None => FieldValue::Scalar,
        }
    }

    fn is_default(&self, name: &FieldKey) -> bool {
        match self.message_type.find_field(name.as_str()) {
            Some(def) => self.is_default_value(&def.field_type, self.get(name.as_str())),
            None => true,
        }
    }
}

/// Returns true for `null`, `""`, `0`, `false`, empty arrays and objects
/// whose members are all zero.
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.values().all(is_zero),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::full_update_reset_mask;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCHEMA: &str = r#"messages:
- name: Bucket
  fields:
  - name: name
    type: {scalar: string}
  - name: spec
    type: {message: BucketSpec}
  - name: labels
    type: {map: {scalar: string}}
  - name: rules
    type: {repeated: {message: Rule}}
  - name: policies
    type: {map: {message: Rule}}
  - name: created_at
    type: {wellKnown: google.protobuf.Timestamp}
- name: BucketSpec
  fields:
  - name: max_size_bytes
    type: {scalar: numeric}
  - name: versioning
    type: {scalar: boolean}
- name: Rule
  fields:
  - name: prefix
    type: {scalar: string}
  - name: ttl
    type: {wellKnown: google.protobuf.Duration}
  - name: enabled
    type: {scalar: boolean}
"#;

    fn reset_mask(value: Value) -> String {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        let message = TypedMessage::new(&schema, "Bucket", &value).unwrap();
        full_update_reset_mask(&message).marshal()
    }

    #[test]
    fn test_empty_value_names_everything() {
        assert_eq!(
            reset_mask(json!({})),
            "created_at.(nanos,seconds),labels.*,name,policies.*,rules.*,spec"
        );
        assert_eq!(reset_mask(json!(null)), reset_mask(json!({})));
    }

    #[test]
    fn test_filled_value() {
        let value = json!({
            "name": "logs",
            "spec": {"max_size_bytes": 1024, "versioning": true},
            "labels": {"team": "infra"},
            "rules": [
                {"prefix": "tmp/", "enabled": true},
                {"prefix": "", "enabled": true}
            ],
            "policies": {"keep": {"prefix": "a", "enabled": true}},
            "created_at": {"seconds": 17}
        });
        assert_eq!(
            reset_mask(value),
            "created_at.(nanos,seconds),policies.*.ttl.(nanos,seconds),rules.*.(prefix,ttl.(nanos,seconds))"
        );
    }

    #[test]
    fn test_partially_default_message() {
        let value = json!({
            "name": "logs",
            "spec": {"max_size_bytes": 0, "versioning": true},
            "labels": {"a": "b"},
            "rules": [],
            "policies": {},
            "created_at": "2024-01-01T00:00:00Z"
        });
        assert_eq!(
            reset_mask(value),
            "created_at.(nanos,seconds),policies.*,rules.*,spec.max_size_bytes"
        );
    }

    #[test]
    fn test_default_detection() {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        let value = json!({
            "name": "",
            "spec": {"max_size_bytes": 0, "versioning": false},
            "labels": {},
            "created_at": {"seconds": 0, "nanos": 0}
        });
        let message = TypedMessage::new(&schema, "Bucket", &value).unwrap();
        for field in ["name", "spec", "labels", "rules", "policies", "created_at"] {
            assert!(message.is_default(&FieldKey::new(field)), "{}", field);
        }

        let value = json!({"spec": {"max_size_bytes": 1}, "created_at": {"seconds": 5}});
        let message = TypedMessage::new(&schema, "Bucket", &value).unwrap();
        assert!(!message.is_default(&FieldKey::new("spec")));
        assert!(!message.is_default(&FieldKey::new("created_at")));
        assert_eq!(message.get("spec"), &json!({"max_size_bytes": 1}));
        assert!(message.get("name").is_null());
    }

    #[test]
    fn test_self_referencing_type_terminates() {
        let schema = Schema::from_yaml(
            "messages:\n- name: Node\n  fields:\n  - name: id\n    type: {scalar: string}\n  - name: child\n    type: {message: Node}\n",
        )
        .unwrap();

        let value = json!({"id": "root"});
        let message = TypedMessage::new(&schema, "Node", &value).unwrap();
        assert_eq!(full_update_reset_mask(&message).marshal(), "child");
        assert!(message.is_default(&FieldKey::new("child")));

        let value = json!({"id": "root", "child": {"id": "", "child": {"id": "leaf"}}});
        let message = TypedMessage::new(&schema, "Node", &value).unwrap();
        assert_eq!(
            full_update_reset_mask(&message).marshal(),
            "child.(child.child,id)"
        );
        assert!(!message.is_default(&FieldKey::new("child")));
    }

    #[test]
    fn test_new_rejects_mismatches() {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        let err = TypedMessage::new(&schema, "Nope", &json!({})).unwrap_err();
        assert_eq!(err, SchemaError::unknown_type("", "Nope"));

        let value = json!({"rules": [{"prefix": 3}]});
        let err = TypedMessage::new(&schema, "Bucket", &value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "rules[0].prefix: type mismatch: expected string, got number"
        );
    }
}
