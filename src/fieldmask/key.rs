//! Field key, a single segment of a path or a mask level.

use std::borrow::Borrow;
use std::fmt;

use super::error::{Error, Result};

/// Returns true if the string can be written without quotes.
pub(crate) fn is_plain_key(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_plain_key_char)
}

/// Returns true if the character may appear in an unquoted key.
pub(crate) fn is_plain_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// FieldKey is one segment of a field path.
///
/// Keys made of `[A-Za-z0-9_]` are written as is, anything else is written as
/// a JSON string.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey(String);

impl FieldKey {
    /// Creates a new key. Any string is a valid key.
    pub fn new(key: impl Into<String>) -> Self {
        FieldKey(key.into())
    }

    /// Returns the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Reads a key from its marshaled form.
    ///
    /// A leading `"` means the key is a JSON string literal; otherwise it must
    /// be a plain key.
    pub fn unmarshal(marshaled: &str) -> Result<FieldKey> {
        if marshaled.starts_with('"') {
            let key: String = serde_json::from_str(marshaled)
                .map_err(|_| Error::malformed_key(marshaled))?;
            return Ok(FieldKey(key));
        }
        if is_plain_key(marshaled) {
            return Ok(FieldKey(marshaled.to_string()));
        }
        Err(Error::malformed_key(marshaled))
    }

    /// Writes the key, quoting it when it has characters outside `[A-Za-z0-9_]`.
    pub fn marshal(&self) -> String {
        if is_plain_key(&self.0) {
            self.0.clone()
        } else {
            quote_ascii(&self.0)
        }
    }
}

/// Quotes a string as a JSON literal with every non-ASCII character escaped.
fn quote_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marshal())
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey({:?})", self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        FieldKey(s.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        FieldKey(s)
    }
}

impl From<&String> for FieldKey {
    fn from(s: &String) -> Self {
        FieldKey(s.clone())
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FieldKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FieldKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
