//! Field path, an ordered sequence of keys.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use super::error::{Error, Result};
use super::key::FieldKey;
use super::mask::Mask;

/// FieldPath is a single path through a message, one key per level.
///
/// A path always corresponds to a mask with exactly one branch and no
/// wildcards.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    keys: Vec<FieldKey>,
}

impl FieldPath {
    /// Creates a new empty path.
    pub fn new() -> Self {
        FieldPath { keys: Vec::new() }
    }

    /// Creates a path from keys.
    pub fn from_keys(keys: Vec<FieldKey>) -> Self {
        FieldPath { keys }
    }

    /// Returns the number of keys in the path.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the path has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldKey> {
        self.keys.iter()
    }

    /// Returns the keys as a slice.
    pub fn as_slice(&self) -> &[FieldKey] {
        &self.keys
    }

    /// Appends a key.
    pub fn push(&mut self, key: impl Into<FieldKey>) {
        self.keys.push(key.into());
    }

    /// Removes and returns the last key.
    pub fn pop(&mut self) -> Option<FieldKey> {
        self.keys.pop()
    }

    /// Returns the last key.
    pub fn last(&self) -> Option<&FieldKey> {
        self.keys.last()
    }

    /// Returns the path without its last key, or `None` for the empty path.
    pub fn parent(&self) -> Option<FieldPath> {
        let (_, init) = self.keys.split_last()?;
        Some(FieldPath::from_keys(init.to_vec()))
    }

    /// Returns a new path with the keys of `other` appended.
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut keys = Vec::with_capacity(self.len() + other.len());
        keys.extend_from_slice(&self.keys);
        keys.extend_from_slice(&other.keys);
        FieldPath { keys }
    }

    /// Builds the single-branch mask for this path.
    pub fn to_mask(&self) -> Mask {
        self.with_mask(&Mask::new())
    }

    /// Builds a mask that places `mask` at the end of this path.
    ///
    /// For the empty path this is `mask` itself.
    pub fn with_mask(&self, mask: &Mask) -> Mask {
        self.keys.iter().rev().fold(mask.clone(), |inner, key| {
            let mut outer = Mask::new();
            outer.field_parts.insert(key.clone(), inner);
            outer
        })
    }

    /// Returns true if this path is strictly shorter than `other` and all of
    /// its keys match the start of `other`.
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.len() < other.len() && other.keys.starts_with(&self.keys)
    }

    /// Returns true if the path is covered by a reset mask.
    pub fn matches_reset_mask(&self, mask: Option<&Mask>) -> bool {
        reset_match(&self.keys, mask).0
    }

    /// Returns true if the path is covered by a reset mask and ends on a leaf.
    pub fn matches_reset_mask_final(&self, mask: Option<&Mask>) -> bool {
        let (has_match, is_final) = reset_match(&self.keys, mask);
        has_match && is_final
    }

    /// Returns true if the path is covered by a select mask.
    ///
    /// A missing or empty mask selects everything.
    pub fn matches_select_mask(&self, mask: Option<&Mask>) -> bool {
        select_match(&self.keys, mask).0
    }

    /// Returns `(has_match, is_inner)` for a select mask.
    ///
    /// `is_inner` is true when the path ends strictly inside a selected region,
    /// so everything below it is selected too.
    pub fn matches_select_mask_inner(&self, mask: Option<&Mask>) -> (bool, bool) {
        select_match(&self.keys, mask)
    }

    /// Writes the path in the mask text format.
    pub fn marshal(&self) -> String {
        self.to_mask().marshal()
    }

    /// Reads a single-path mask. Returns `None` when the text is empty.
    pub fn unmarshal(source: &str) -> Result<Option<FieldPath>> {
        Mask::unmarshal(source)?.to_field_path()
    }
}

/// Walks a reset mask and returns `(has_match, is_final)`.
fn reset_match(keys: &[FieldKey], mask: Option<&Mask>) -> (bool, bool) {
    let Some(mask) = mask else {
        return (false, false);
    };
    let Some((key, rest)) = keys.split_first() else {
        return (true, mask.is_empty());
    };
    let (mut has_match, mut is_final) = match mask.any.as_deref() {
        Some(any) => reset_match(rest, Some(any)),
        None => (false, false),
    };
    if let Some(sub) = mask.field_parts.get(key) {
        let (key_match, key_final) = reset_match(rest, Some(sub));
        has_match |= key_match;
        if key_match {
            is_final |= key_final;
        }
    }
    (has_match, is_final)
}

/// Walks a select mask and returns `(has_match, is_inner)`.
fn select_match(keys: &[FieldKey], mask: Option<&Mask>) -> (bool, bool) {
    let mask = match mask {
        Some(mask) if !mask.is_empty() => mask,
        _ => return (true, !keys.is_empty()),
    };
    let Some((key, rest)) = keys.split_first() else {
        return (true, false);
    };
    let (mut has_match, mut is_inner) = match mask.any.as_deref() {
        Some(any) => select_match(rest, Some(any)),
        None => (false, false),
    };
    if let Some(sub) = mask.field_parts.get(key) {
        let (key_match, key_inner) = select_match(rest, Some(sub));
        has_match |= key_match;
        if key_match {
            is_inner |= key_inner;
        }
    }
    (has_match, is_inner)
}

impl<K: Into<FieldKey>> FromIterator<K> for FieldPath {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        FieldPath {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<K: Into<FieldKey>> From<Vec<K>> for FieldPath {
    fn from(keys: Vec<K>) -> Self {
        keys.into_iter().collect()
    }
}

impl IntoIterator for FieldPath {
    type Item = FieldKey;
    type IntoIter = std::vec::IntoIter<FieldKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a FieldKey;
    type IntoIter = std::slice::Iter<'a, FieldKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl Add<&FieldPath> for &FieldPath {
    type Output = FieldPath;

    fn add(self, other: &FieldPath) -> FieldPath {
        self.join(other)
    }
}

impl AddAssign<&FieldPath> for FieldPath {
    fn add_assign(&mut self, other: &FieldPath) {
        self.keys.extend_from_slice(&other.keys);
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(FieldPath::unmarshal(s)?.unwrap_or_default())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marshal())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({})", self.marshal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(keys: &[&str]) -> FieldPath {
        keys.iter().copied().collect()
    }

    fn mask(s: &str) -> Mask {
        Mask::unmarshal(s).unwrap()
    }

    #[test]
    fn test_to_mask() {
        assert_eq!(path(&["a", "b"]).to_mask().marshal(), "a.b");
        assert_eq!(path(&["spec", "max_size_bytes"]).marshal(), "spec.max_size_bytes");
        assert!(FieldPath::new().to_mask().is_empty());
        assert_eq!(path(&["a", "b.c"]).marshal(), r#"a."b.c""#);
    }

    #[test]
    fn test_unmarshal() {
        assert_eq!(FieldPath::unmarshal("a.b").unwrap(), Some(path(&["a", "b"])));
        assert_eq!(FieldPath::unmarshal("  ").unwrap(), None);
        assert_eq!(FieldPath::unmarshal("a.*").unwrap_err(), Error::WildcardInMask);
        assert_eq!(FieldPath::unmarshal("a,b").unwrap_err(), Error::MultiplePaths);
        assert!(FieldPath::unmarshal("a.").unwrap_err().is_parse());

        let parsed: FieldPath = r#"spec."x-y""#.parse().unwrap();
        assert_eq!(parsed, path(&["spec", "x-y"]));
    }

    #[test]
    fn test_parent_and_join() {
        let p = path(&["a", "b", "c"]);
        assert_eq!(p.parent(), Some(path(&["a", "b"])));
        assert_eq!(path(&["a"]).parent(), Some(FieldPath::new()));
        assert_eq!(FieldPath::new().parent(), None);

        let joined = &path(&["a"]) + &path(&["b", "c"]);
        assert_eq!(joined, p);

        let mut grown = path(&["a"]);
        grown += &path(&["b"]);
        grown.push("c");
        assert_eq!(grown, p);
    }

    #[test]
    fn test_with_mask() {
        let attached = path(&["spec", "disks"]).with_mask(&mask("*.size,boot"));
        assert_eq!(attached.marshal(), "spec.disks.(*.size,boot)");
        assert_eq!(FieldPath::new().with_mask(&mask("a,b")), mask("a,b"));
    }

    #[test]
    fn test_is_prefix_of() {
        let ab = path(&["a", "b"]);
        assert!(path(&["a"]).is_prefix_of(&ab));
        assert!(FieldPath::new().is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&ab));
        assert!(!path(&["b"]).is_prefix_of(&ab));
        assert!(!path(&["a", "b", "c"]).is_prefix_of(&ab));
    }

    #[test]
    fn test_matches_reset_mask() {
        let m = mask("spec.(*.size,disks.boot),labels");
        assert!(path(&["labels"]).matches_reset_mask(Some(&m)));
        assert!(path(&["labels"]).matches_reset_mask_final(Some(&m)));
        assert!(path(&["spec"]).matches_reset_mask(Some(&m)));
        assert!(!path(&["spec"]).matches_reset_mask_final(Some(&m)));
        assert!(path(&["spec", "anything", "size"]).matches_reset_mask_final(Some(&m)));
        assert!(path(&["spec", "disks", "boot"]).matches_reset_mask_final(Some(&m)));
        assert!(path(&["spec", "disks", "size"]).matches_reset_mask_final(Some(&m)));
        assert!(!path(&["spec", "disks", "type"]).matches_reset_mask(Some(&m)));
        assert!(!path(&["labels", "x"]).matches_reset_mask(Some(&m)));
        assert!(!path(&["status"]).matches_reset_mask(Some(&m)));
        assert!(!path(&["labels"]).matches_reset_mask(None));
        assert!(FieldPath::new().matches_reset_mask(Some(&m)));
    }

    #[test]
    fn test_matches_select_mask() {
        let m = mask("spec.(*.size,disks),labels");
        assert_eq!(path(&["spec"]).matches_select_mask_inner(Some(&m)), (true, false));
        assert_eq!(path(&["spec", "disks", "x"]).matches_select_mask_inner(Some(&m)), (true, true));
        assert_eq!(path(&["spec", "other", "size"]).matches_select_mask_inner(Some(&m)), (true, false));
        assert_eq!(path(&["spec", "other", "kind"]).matches_select_mask_inner(Some(&m)), (false, false));
        assert_eq!(path(&["labels", "k"]).matches_select_mask_inner(Some(&m)), (true, true));
        assert!(!path(&["status"]).matches_select_mask(Some(&m)));

        // No constraint selects everything.
        assert!(path(&["status"]).matches_select_mask(None));
        assert!(path(&["status"]).matches_select_mask(Some(&Mask::new())));
        assert_eq!(FieldPath::new().matches_select_mask_inner(None), (true, false));
    }

    #[test]
    fn test_display_and_debug() {
        let p = path(&["a", "b c"]);
        assert_eq!(p.to_string(), r#"a."b c""#);
        assert_eq!(format!("{:?}", p), r#"FieldPath(a."b c")"#);
    }
}
