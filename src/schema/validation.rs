//! Schema errors and validation of values against message types.

use serde_json::Value;
use thiserror::Error;

use super::elements::{FieldKind, FieldType, MessageType, Scalar, Schema};

/// SchemaError represents an invalid schema or a value that does not match it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{message}")]
    Parse { message: String },

    #[error("duplicate message type: {name}")]
    DuplicateMessage { name: String },

    #[error("{path}: unknown type: {name}")]
    UnknownType { path: String, name: String },

    #[error("{path}: type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("{path}: unknown field: {field}")]
    UnknownField { path: String, field: String },

    #[error("{path}: {message}")]
    Invalid { path: String, message: String },
}

impl SchemaError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(path: impl Into<String>, name: impl Into<String>) -> Self {
        SchemaError::UnknownType {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SchemaError::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(path: impl Into<String>, field: impl Into<String>) -> Self {
        SchemaError::UnknownField {
            path: path.into(),
            field: field.into(),
        }
    }

    /// Creates a generic error at a path.
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Returns the JSON kind name of a value, for error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks that `value` is an instance of `message`. `null` stands for the
/// unset message.
pub(crate) fn validate_message(
    schema: &Schema,
    message: &MessageType,
    value: &Value,
    path: &str,
) -> Result<(), SchemaError> {
    let fields = match value {
        Value::Null => return Ok(()),
        Value::Object(fields) => fields,
        other => {
            return Err(SchemaError::type_mismatch(
                path,
                format!("message {}", message.name),
                kind_name(other),
            ))
        }
    };
    for (name, field_value) in fields {
        let field = message
            .find_field(name)
            .ok_or_else(|| SchemaError::unknown_field(path, name))?;
        validate_value(schema, &field.field_type, field_value, &join(path, name))?;
    }
    Ok(())
}

/// Checks that `value` matches `field_type`. `null` is accepted anywhere.
pub(crate) fn validate_value(
    schema: &Schema,
    field_type: &FieldType,
    value: &Value,
    path: &str,
) -> Result<(), SchemaError> {
    if value.is_null() {
        return Ok(());
    }
    match field_type.kind(path)? {
        FieldKind::Scalar(scalar) => validate_scalar(scalar, value, path),
        FieldKind::Message(name) => {
            let message = schema
                .find_message(name)
                .ok_or_else(|| SchemaError::unknown_type(path, name))?;
            validate_message(schema, message, value, path)
        }
        FieldKind::Repeated(element) => {
            let Value::Array(items) = value else {
                return Err(SchemaError::type_mismatch(path, "array", kind_name(value)));
            };
            for (i, item) in items.iter().enumerate() {
                validate_value(schema, element, item, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        FieldKind::Map(element) => {
            let Value::Object(entries) = value else {
                return Err(SchemaError::type_mismatch(path, "object", kind_name(value)));
            };
            for (key, item) in entries {
                validate_value(schema, element, item, &format!("{}[{:?}]", path, key))?;
            }
            Ok(())
        }
        FieldKind::WellKnown(name) => match value {
            Value::Array(_) => Err(SchemaError::type_mismatch(path, name, "array")),
            _ => Ok(()),
        },
    }
}

fn validate_scalar(scalar: Scalar, value: &Value, path: &str) -> Result<(), SchemaError> {
    let ok = match scalar {
        Scalar::Numeric => value.is_number(),
        Scalar::String => value.is_string(),
        Scalar::Boolean => value.is_boolean(),
        Scalar::Untyped => !value.is_array() && !value.is_object(),
    };
    if ok {
        return Ok(());
    }
    let expected = match scalar {
        Scalar::Numeric => "number",
        Scalar::String => "string",
        Scalar::Boolean => "boolean",
        Scalar::Untyped => "scalar",
    };
    Err(SchemaError::type_mismatch(path, expected, kind_name(value)))
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}
