//! Mask tree and its algebra.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::{
    Add, AddAssign, BitAnd, Div, DivAssign, Mul, MulAssign, Sub, SubAssign,
};

use super::error::{Error, Result};
use super::key::FieldKey;
use super::path::FieldPath;

/// FieldParts maps named keys to their sub-masks.
pub type FieldParts = BTreeMap<FieldKey, Mask>;

/// Mask is a tree of fields with an optional wildcard branch at each level.
///
/// An empty mask is a leaf: it stands for the path that leads to it and
/// nothing more specific. Every node owns its children, so cloning a mask
/// always produces an independent deep copy.
#[derive(Clone, Default)]
pub struct Mask {
    /// Branch that applies to every key at this level.
    pub any: Option<Box<Mask>>,
    /// Named branches.
    pub field_parts: FieldParts,
}

impl Mask {
    /// Creates a new empty mask.
    pub fn new() -> Self {
        Mask {
            any: None,
            field_parts: BTreeMap::new(),
        }
    }

    /// Creates a mask holding only a wildcard branch.
    pub fn wildcard(sub: Mask) -> Self {
        Mask {
            any: Some(Box::new(sub)),
            field_parts: BTreeMap::new(),
        }
    }

    /// Creates a mask from named branches.
    pub fn with_fields<K, I>(fields: I) -> Self
    where
        K: Into<FieldKey>,
        I: IntoIterator<Item = (K, Mask)>,
    {
        Mask {
            any: None,
            field_parts: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns true if the mask has neither a wildcard nor named branches.
    pub fn is_empty(&self) -> bool {
        self.any.is_none() && self.field_parts.is_empty()
    }

    /// Returns the number of top-level branches, the wildcard included.
    pub fn len(&self) -> usize {
        self.field_parts.len() + usize::from(self.any.is_some())
    }

    /// Sets a named branch, returning the previous one.
    pub fn insert(&mut self, key: impl Into<FieldKey>, sub: Mask) -> Option<Mask> {
        self.field_parts.insert(key.into(), sub)
    }

    /// Sets the wildcard branch, returning the previous one.
    pub fn set_any(&mut self, sub: Mask) -> Option<Mask> {
        self.any.replace(Box::new(sub)).map(|b| *b)
    }

    /// Returns the effective sub-mask for a key.
    ///
    /// A named branch is combined with the wildcard branch when both exist;
    /// a key without a named branch falls back to the wildcard branch.
    pub fn sub_mask(&self, key: &FieldKey) -> Option<Cow<'_, Mask>> {
        match (self.field_parts.get(key), self.any.as_deref()) {
            (Some(named), Some(any)) => {
                let mut combined = named.clone();
                combined.merge(any);
                Some(Cow::Owned(combined))
            }
            (Some(named), None) => Some(Cow::Borrowed(named)),
            (None, any) => any.map(Cow::Borrowed),
        }
    }

    /// Walks the path level by level with [`Mask::sub_mask`].
    ///
    /// Returns `None` as soon as a level has no mask for the next key.
    pub fn sub_mask_at(&self, path: &FieldPath) -> Option<Cow<'_, Mask>> {
        let mut current = Cow::Borrowed(self);
        for key in path {
            current = match current {
                Cow::Borrowed(mask) => mask.sub_mask(key)?,
                Cow::Owned(mask) => Cow::Owned(mask.sub_mask(key)?.into_owned()),
            };
        }
        Some(current)
    }

    /// Converts an unbranched, wildcard-free mask to a path.
    ///
    /// Returns `None` for the empty mask.
    pub fn to_field_path(&self) -> Result<Option<FieldPath>> {
        let mut path = FieldPath::new();
        let mut current = self;
        loop {
            if current.any.is_some() {
                return Err(Error::WildcardInMask);
            }
            if current.field_parts.len() > 1 {
                return Err(Error::MultiplePaths);
            }
            match current.field_parts.iter().next() {
                Some((key, sub)) => {
                    path.push(key.clone());
                    current = sub;
                }
                None => break,
            }
        }
        Ok(if path.is_empty() { None } else { Some(path) })
    }

    /// Returns true if the mask can be converted to a single path.
    pub fn is_field_path(&self) -> bool {
        self.to_field_path().is_ok()
    }

    /// Merges another mask into this one. Nothing is ever dropped.
    pub fn merge(&mut self, other: &Mask) {
        if other.is_empty() {
            return;
        }
        if let Some(other_any) = other.any.as_deref() {
            self.any.get_or_insert_with(Box::default).merge(other_any);
        }
        for (key, sub) in &other.field_parts {
            self.field_parts.entry(key.clone()).or_default().merge(sub);
        }
    }

    /// Intersects two masks with reset-mask semantics.
    ///
    /// A wildcard on either side is matched against every named key of the
    /// other side as well as against the other wildcard. Results reaching the
    /// same key are merged. A named key reached by any source is kept even when
    /// the intersection below it is empty.
    pub fn intersect_reset_mask(&self, other: &Mask) -> Mask {
        let mut ret = Mask::new();
        if let Some(self_any) = self.any.as_deref() {
            ret.any = other
                .any
                .as_deref()
                .map(|other_any| Box::new(self_any.intersect_reset_mask(other_any)));
            for (key, sub) in &other.field_parts {
                ret.field_parts
                    .insert(key.clone(), self_any.intersect_reset_mask(sub));
            }
        }
        if let Some(other_any) = other.any.as_deref() {
            for (key, sub) in &self.field_parts {
                let inner = other_any.intersect_reset_mask(sub);
                ret.field_parts.entry(key.clone()).or_default().merge(&inner);
            }
        }
        for (key, sub) in &self.field_parts {
            if let Some(other_sub) = other.field_parts.get(key) {
                let inner = sub.intersect_reset_mask(other_sub);
                ret.field_parts.entry(key.clone()).or_default().merge(&inner);
            }
        }
        ret
    }

    /// Intersects two masks structurally.
    ///
    /// Wildcards only meet wildcards and named keys only meet the same named
    /// keys.
    pub fn intersect_dumb(&self, other: &Mask) -> Mask {
        let mut ret = Mask::new();
        if let (Some(self_any), Some(other_any)) = (self.any.as_deref(), other.any.as_deref()) {
            ret.any = Some(Box::new(self_any.intersect_dumb(other_any)));
        }
        for (key, sub) in &self.field_parts {
            if let Some(other_sub) = other.field_parts.get(key) {
                ret.field_parts.insert(key.clone(), sub.intersect_dumb(other_sub));
            }
        }
        ret
    }

    /// Removes another mask from this one structurally.
    ///
    /// Named keys are only reduced by the same named keys of `other`, the
    /// wildcard only by the wildcard of `other`. Branches left empty are
    /// removed.
    pub fn subtract_dumb(&mut self, other: &Mask) {
        let any_emptied = match (self.any.as_deref_mut(), other.any.as_deref()) {
            (Some(self_any), Some(other_any)) => {
                self_any.subtract_dumb(other_any);
                self_any.is_empty()
            }
            _ => false,
        };
        if any_emptied {
            self.any = None;
        }
        self.field_parts.retain(|key, sub| match other.field_parts.get(key) {
            Some(other_sub) => {
                sub.subtract_dumb(other_sub);
                !sub.is_empty()
            }
            None => true,
        });
    }

    /// Removes another mask from this one with reset-mask semantics.
    ///
    /// Each named key is reduced by the wildcard of `other` and by the same
    /// named key of `other`, and is removed once nothing remains. A key with
    /// no counterpart in `other` is left as is. The wildcard of this mask is
    /// only reduced by the wildcard of `other`.
    pub fn subtract_reset_mask(&mut self, other: &Mask) {
        let other_any = other.any.as_deref();
        let any_emptied = match (self.any.as_deref_mut(), other_any) {
            (Some(self_any), Some(other_any)) => {
                self_any.subtract_reset_mask(other_any);
                self_any.is_empty()
            }
            _ => false,
        };
        if any_emptied {
            self.any = None;
        }
        self.field_parts.retain(|key, sub| {
            let named = other.field_parts.get(key);
            if other_any.is_none() && named.is_none() {
                return true;
            }
            for counterpart in other_any.into_iter().chain(named) {
                sub.subtract_reset_mask(counterpart);
            }
            !sub.is_empty()
        });
    }
}

impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Mask, &Mask)> = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            match (left.any.as_deref(), right.any.as_deref()) {
                (None, None) => {}
                (Some(l), Some(r)) => pending.push((l, r)),
                _ => return false,
            }
            if left.field_parts.len() != right.field_parts.len() {
                return false;
            }
            for (key, l) in &left.field_parts {
                match right.field_parts.get(key) {
                    Some(r) => pending.push((l, r)),
                    None => return false,
                }
            }
        }
        true
    }
}

impl Eq for Mask {}

impl From<FieldPath> for Mask {
    fn from(path: FieldPath) -> Self {
        path.to_mask()
    }
}

impl From<&FieldPath> for Mask {
    fn from(path: &FieldPath) -> Self {
        path.to_mask()
    }
}

// Merge.

impl AddAssign<&Mask> for Mask {
    fn add_assign(&mut self, other: &Mask) {
        self.merge(other);
    }
}

impl AddAssign<Mask> for Mask {
    fn add_assign(&mut self, other: Mask) {
        self.merge(&other);
    }
}

impl AddAssign<&FieldPath> for Mask {
    fn add_assign(&mut self, path: &FieldPath) {
        self.merge(&path.to_mask());
    }
}

impl Add<&Mask> for &Mask {
    type Output = Mask;

    fn add(self, other: &Mask) -> Mask {
        let mut ret = self.clone();
        ret.merge(other);
        ret
    }
}

impl Add<&Mask> for Mask {
    type Output = Mask;

    fn add(mut self, other: &Mask) -> Mask {
        self.merge(other);
        self
    }
}

impl Add for Mask {
    type Output = Mask;

    fn add(mut self, other: Mask) -> Mask {
        self.merge(&other);
        self
    }
}

// Reset-mask intersection.

impl BitAnd<&Mask> for &Mask {
    type Output = Mask;

    fn bitand(self, other: &Mask) -> Mask {
        self.intersect_reset_mask(other)
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    fn bitand(self, other: Mask) -> Mask {
        self.intersect_reset_mask(&other)
    }
}

// Structural intersection.

impl MulAssign<&Mask> for Mask {
    fn mul_assign(&mut self, other: &Mask) {
        *self = self.intersect_dumb(other);
    }
}

impl Mul<&Mask> for &Mask {
    type Output = Mask;

    fn mul(self, other: &Mask) -> Mask {
        self.intersect_dumb(other)
    }
}

impl Mul for Mask {
    type Output = Mask;

    fn mul(self, other: Mask) -> Mask {
        self.intersect_dumb(&other)
    }
}

// Reset-mask subtraction.

impl SubAssign<&Mask> for Mask {
    fn sub_assign(&mut self, other: &Mask) {
        self.subtract_reset_mask(other);
    }
}

impl Sub<&Mask> for &Mask {
    type Output = Mask;

    fn sub(self, other: &Mask) -> Mask {
        let mut ret = self.clone();
        ret.subtract_reset_mask(other);
        ret
    }
}

impl Sub<&Mask> for Mask {
    type Output = Mask;

    fn sub(mut self, other: &Mask) -> Mask {
        self.subtract_reset_mask(other);
        self
    }
}

// Structural subtraction.

impl DivAssign<&Mask> for Mask {
    fn div_assign(&mut self, other: &Mask) {
        self.subtract_dumb(other);
    }
}

impl Div<&Mask> for &Mask {
    type Output = Mask;

    fn div(self, other: &Mask) -> Mask {
        let mut ret = self.clone();
        ret.subtract_dumb(other);
        ret
    }
}

impl Div<&Mask> for Mask {
    type Output = Mask;

    fn div(mut self, other: &Mask) -> Mask {
        self.subtract_dumb(other);
        self
    }
}
