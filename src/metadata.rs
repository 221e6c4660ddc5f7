//! Request metadata and the reset mask header.
//!
//! Metadata is an ordered list of `(key, value)` pairs with case-insensitive
//! keys, as carried by RPC headers. A full update request carries its reset
//! mask under [`RESET_MASK_HEADER`].

use tracing::debug;

use crate::fieldmask::{Mask, Result};
use crate::message::Message;

/// Metadata header name used for reset masks.
pub const RESET_MASK_HEADER: &str = "X-ResetMask";

/// Metadata is an ordered multimap with lowercased keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Metadata::default()
    }

    /// Appends a value for a key.
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_lowercase(), value.into()));
    }

    /// Replaces every value of a key with `values`.
    pub fn insert<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.remove(key);
        let key = key.to_lowercase();
        self.entries
            .extend(values.into_iter().map(|v| (key.clone(), v.into())));
    }

    /// Returns every value of a key, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns the last value of a key, or the first one when `first` is set.
    pub fn get_one(&self, key: &str, first: bool) -> Option<&str> {
        let values = self.get_all(key);
        if first {
            values.first().copied()
        } else {
            values.last().copied()
        }
    }

    /// Returns true if the key has at least one value.
    pub fn contains(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.entries.iter().any(|(k, _)| *k == key)
    }

    /// Removes every value of a key.
    pub fn remove(&mut self, key: &str) {
        let key = key.to_lowercase();
        self.entries.retain(|(k, _)| *k != key);
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries, counting every value of a key.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the last reset mask header, if any.
    pub fn reset_mask(&self) -> Result<Option<Mask>> {
        self.get_one(RESET_MASK_HEADER, false)
            .map(Mask::unmarshal)
            .transpose()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.add(k.as_ref(), v);
        }
        metadata
    }
}

/// Adds the full update reset mask of `message` to `metadata` unless a reset
/// mask header is already present.
pub fn ensure_reset_mask<M: Message + ?Sized>(message: &M, mut metadata: Metadata) -> Metadata {
    if metadata.contains(RESET_MASK_HEADER) {
        debug!("reset mask header already present");
        return metadata;
    }
    let mask = message.full_update_reset_mask().marshal();
    debug!(mask = %mask, "adding reset mask header");
    metadata.insert(RESET_MASK_HEADER, [mask]);
    metadata
}
