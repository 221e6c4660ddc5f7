//! Text form of masks.
//!
//! Masks are written as comma separated branches, dots between levels and
//! parentheses around levels with more than one branch:
//!
//! - `a.b.c` is a nested path,
//! - `a,b` are two sibling branches,
//! - `a.(b,c)` groups branches under `a` and equals `a.b,a.c`,
//! - `*` is the wildcard branch of a level.
//!
//! Sibling branches are sorted by their text, so the written form of a mask
//! does not depend on how it was built.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::mask::Mask;
use crate::parser;

/// Key used for the wildcard branch in the text and tree forms.
pub const WILDCARD: &str = "*";

impl Mask {
    /// Writes the mask in its canonical text form.
    pub fn marshal(&self) -> String {
        self.marshal_counted().1
    }

    /// Returns the number of top-level branches together with the text.
    fn marshal_counted(&self) -> (usize, String) {
        if self.is_empty() {
            return (0, String::new());
        }
        let mut branches = Vec::with_capacity(self.len());
        if let Some(any) = self.any.as_deref() {
            branches.push(marshal_branch(WILDCARD, any));
        }
        for (key, sub) in &self.field_parts {
            branches.push(marshal_branch(&key.marshal(), sub));
        }
        branches.sort();
        (branches.len(), branches.join(","))
    }

    /// Parses the text form. Empty or blank text is the empty mask.
    pub fn unmarshal(source: &str) -> Result<Mask> {
        Ok(parser::parse(source)?)
    }

    /// Returns a nested JSON object view of the mask.
    ///
    /// Keys are written in their text form, the wildcard as `"*"`, and leaves
    /// are empty objects.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(any) = self.any.as_deref() {
            obj.insert(WILDCARD.to_string(), any.to_json_value());
        }
        for (key, sub) in &self.field_parts {
            obj.insert(key.marshal(), sub.to_json_value());
        }
        serde_json::Value::Object(obj)
    }
}

fn marshal_branch(key: &str, sub: &Mask) -> String {
    match sub.marshal_counted() {
        (0, _) => key.to_string(),
        (1, inner) => format!("{}.{}", key, inner),
        (_, inner) => format!("{}.({})", key, inner),
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marshal())
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({})", self.marshal())
    }
}

impl FromStr for Mask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Mask::unmarshal(s)
    }
}

impl Serialize for Mask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.marshal())
    }
}

impl<'de> Deserialize<'de> for Mask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Mask::unmarshal(&text).map_err(de::Error::custom)
    }
}
