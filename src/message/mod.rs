//! Message module - Full update reset masks of structured messages.
//!
//! Partial update protocols usually leave default-valued fields off the wire,
//! so a receiver cannot tell "reset to default" from "not mentioned". The full
//! update reset mask names every field that the receiver must reset: fields at
//! their default value, and the parts of nested values that are themselves
//! default.
//!
//! The message runtime is external. It plugs in through the [`Message`] trait,
//! which exposes declared fields, their values and default checks.

pub mod well_known;

use tracing::trace;

use crate::fieldmask::{FieldKey, Mask};

/// Message is the view of a structured message needed to build reset masks.
pub trait Message {
    /// Returns the declared field names, in a stable order.
    fn declared_fields(&self) -> Vec<FieldKey>;

    /// Returns the current value of a declared field.
    ///
    /// An unset message field is reported as [`FieldValue::Scalar`] so the walk
    /// names the field and does not descend into it.
    fn field(&self, name: &FieldKey) -> FieldValue<'_>;

    /// Returns true if the field holds its default value.
    fn is_default(&self, name: &FieldKey) -> bool;

    /// Returns the full update reset mask of this message.
    fn full_update_reset_mask(&self) -> Mask {
        full_update_reset_mask(self)
    }
}

/// FieldValue is the shape of a field value as far as reset masks care.
pub enum FieldValue<'a> {
    /// A scalar; its reset mask is always empty.
    Scalar,
    /// A nested message.
    Message(Box<dyn Message + 'a>),
    /// A repeated field, one entry per element.
    Repeated(Vec<FieldValue<'a>>),
    /// A map field, one entry per map value.
    Map(Vec<FieldValue<'a>>),
    /// A value with a fixed reset mask, such as a well-known type.
    Masked(Mask),
}

impl FieldValue<'_> {
    /// Returns true for values whose reset mask comes from their structure.
    fn is_structured(&self) -> bool {
        matches!(self, FieldValue::Message(_) | FieldValue::Masked(_))
    }

    /// Returns the reset mask of this value.
    pub fn reset_mask(&self) -> Mask {
        match self {
            FieldValue::Scalar => Mask::new(),
            FieldValue::Message(message) => message.full_update_reset_mask(),
            FieldValue::Masked(mask) => mask.clone(),
            FieldValue::Repeated(elements) => repeated_reset_mask(elements),
            FieldValue::Map(values) => map_reset_mask(values),
        }
    }
}

/// Computes the full update reset mask of a message.
///
/// A field is named when its own reset mask is not empty or when it holds its
/// default value.
pub fn full_update_reset_mask<M: Message + ?Sized>(message: &M) -> Mask {
    let mut mask = Mask::new();
    for name in message.declared_fields() {
        let sub = message.field(&name).reset_mask();
        if !sub.is_empty() || message.is_default(&name) {
            trace!(field = %name, sub = %sub, "field added to reset mask");
            mask.insert(name, sub);
        }
    }
    mask
}

/// An empty sequence resets everything below it. A sequence of structured
/// values resets the union of their masks for every element. Scalars need no
/// mask.
fn repeated_reset_mask(elements: &[FieldValue<'_>]) -> Mask {
    match elements.first() {
        None => Mask::wildcard(Mask::new()),
        Some(first) if first.is_structured() => {
            let mut any = Mask::new();
            for element in elements {
                any += element.reset_mask();
            }
            Mask::wildcard(any)
        }
        Some(_) => Mask::new(),
    }
}

/// An empty map resets everything below it. A map holding any scalar needs no
/// mask, otherwise the non-empty value masks are merged for every key.
fn map_reset_mask(values: &[FieldValue<'_>]) -> Mask {
    if values.is_empty() {
        return Mask::wildcard(Mask::new());
    }
    let mut ret = Mask::new();
    for value in values {
        if !value.is_structured() {
            return Mask::new();
        }
        let sub = value.reset_mask();
        if !sub.is_empty() {
            ret.any.get_or_insert_with(Box::default).merge(&sub);
        }
    }
    ret
}
