//! Core schema elements and type definitions.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::validation::SchemaError;
use crate::message::well_known;

/// Schema is a list of named message types.
///
/// Message types are indexed in a map before the first search so this type
/// should be considered immutable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageType>,

    #[serde(skip)]
    message_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        Schema::with_messages(self.messages.clone())
    }
}

/// MessageType is a named message with its declared fields.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MessageType {
    /// Every message type must have a unique name.
    pub name: String,

    /// Declared fields, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,

    #[serde(skip)]
    field_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for MessageType {
    fn clone(&self) -> Self {
        MessageType::with_fields(self.name.clone(), self.fields.clone())
    }
}

/// FieldDef pairs a field name with a field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(default, rename = "type")]
    pub field_type: FieldType,
}

/// FieldType declares the type of a field or of a container's elements.
///
/// Exactly one member must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<Scalar>,

    /// Name of a message type of the same schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Element type of a repeated field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeated: Option<Box<FieldType>>,

    /// Value type of a map field. Map keys are always strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Box<FieldType>>,

    /// Name of a well-known type, such as `google.protobuf.Timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "wellKnown")]
    pub well_known: Option<String>,
}

/// Scalar represents a type which has a single value which is either numeric,
/// string, or boolean, or untyped for any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    Numeric,
    String,
    Boolean,
    Untyped,
}

/// FieldKind is the resolved member of a [`FieldType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind<'a> {
    Scalar(Scalar),
    Message(&'a str),
    Repeated(&'a FieldType),
    Map(&'a FieldType),
    WellKnown(&'a str),
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Creates a schema with the given message types.
    pub fn with_messages(messages: Vec<MessageType>) -> Self {
        Schema {
            messages,
            message_map: OnceCell::new(),
        }
    }

    /// Reads and validates a schema from YAML. JSON is accepted too.
    pub fn from_yaml(yaml: &str) -> Result<Schema, SchemaError> {
        let schema: Schema = serde_yaml::from_str(yaml)
            .map_err(|e| SchemaError::parse(format!("failed to parse schema: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Returns the list of message type names in this schema.
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.name.as_str()).collect()
    }

    /// FindMessage returns the named message type, if it exists.
    pub fn find_message(&self, name: &str) -> Option<&MessageType> {
        let map = self.message_map.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.messages.len());
            for (i, m) in self.messages.iter().enumerate() {
                map.entry(m.name.clone()).or_insert(i);
            }
            map
        });
        map.get(name).map(|&i| &self.messages[i])
    }

    /// Checks that names are unique, that every field type sets exactly one
    /// member and that every referenced type exists.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, message) in self.messages.iter().enumerate() {
            if message.name.is_empty() {
                return Err(SchemaError::invalid(format!("messages[{}]", i), "message type has no name"));
            }
            if self.messages[..i].iter().any(|m| m.name == message.name) {
                return Err(SchemaError::DuplicateMessage {
                    name: message.name.clone(),
                });
            }
            for (j, field) in message.fields.iter().enumerate() {
                let path = format!("{}.{}", message.name, field.name);
                if field.name.is_empty() {
                    return Err(SchemaError::invalid(path, "field has no name"));
                }
                if message.fields[..j].iter().any(|f| f.name == field.name) {
                    return Err(SchemaError::invalid(path, "duplicate field"));
                }
                self.validate_type(&field.field_type, &path)?;
            }
        }
        Ok(())
    }

    fn validate_type(&self, field_type: &FieldType, path: &str) -> Result<(), SchemaError> {
        match field_type.kind(path)? {
            FieldKind::Scalar(_) => Ok(()),
            FieldKind::Message(name) => match self.find_message(name) {
                Some(_) => Ok(()),
                None => Err(SchemaError::unknown_type(path, name)),
            },
            FieldKind::Repeated(element) => self.validate_type(element, &format!("{}[]", path)),
            FieldKind::Map(value) => self.validate_type(value, &format!("{}{{}}", path)),
            FieldKind::WellKnown(name) => match well_known::mask_for(name) {
                Some(_) => Ok(()),
                None => Err(SchemaError::unknown_type(path, name)),
            },
        }
    }
}

impl MessageType {
    /// Creates a message type with the given fields.
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        MessageType {
            name: name.into(),
            fields,
            field_map: OnceCell::new(),
        }
    }

    /// FindField returns the named field, if it exists.
    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        let map = self.field_map.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.fields.len());
            for (i, f) in self.fields.iter().enumerate() {
                map.entry(f.name.clone()).or_insert(i);
            }
            map
        });
        map.get(name).map(|&i| &self.fields[i])
    }
}

impl FieldDef {
    /// Creates a field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            field_type,
        }
    }
}

impl FieldType {
    /// Creates a scalar type.
    pub fn scalar(scalar: Scalar) -> Self {
        FieldType {
            scalar: Some(scalar),
            ..Default::default()
        }
    }

    /// Creates a reference to a message type.
    pub fn message(name: impl Into<String>) -> Self {
        FieldType {
            message: Some(name.into()),
            ..Default::default()
        }
    }

    /// Creates a repeated type of the given elements.
    pub fn repeated(element: FieldType) -> Self {
        FieldType {
            repeated: Some(Box::new(element)),
            ..Default::default()
        }
    }

    /// Creates a string-keyed map type of the given values.
    pub fn map(value: FieldType) -> Self {
        FieldType {
            map: Some(Box::new(value)),
            ..Default::default()
        }
    }

    /// Creates a reference to a well-known type.
    pub fn well_known(name: impl Into<String>) -> Self {
        FieldType {
            well_known: Some(name.into()),
            ..Default::default()
        }
    }

    /// Returns the single member that is set. `path` names the type in errors.
    pub fn kind(&self, path: &str) -> Result<FieldKind<'_>, SchemaError> {
        let mut kinds = Vec::with_capacity(1);
        if let Some(scalar) = self.scalar {
            kinds.push(FieldKind::Scalar(scalar));
        }
        if let Some(name) = &self.message {
            kinds.push(FieldKind::Message(name));
        }
        if let Some(element) = &self.repeated {
            kinds.push(FieldKind::Repeated(element));
        }
        if let Some(value) = &self.map {
            kinds.push(FieldKind::Map(value));
        }
        if let Some(name) = &self.well_known {
            kinds.push(FieldKind::WellKnown(name));
        }
        match kinds.as_slice() {
            [kind] => Ok(*kind),
            _ => Err(SchemaError::invalid(
                path,
                "field type must set exactly one of scalar, message, repeated, map, wellKnown",
            )),
        }
    }
}
