//! Schema module defines a small declarative language for message types.
//!
//! A schema lists named message types and their fields. It is read from YAML
//! or JSON and lets plain JSON values stand in for messages when computing
//! full update reset masks, see [`TypedMessage`].

mod elements;
mod typed_message;
mod validation;

pub use elements::*;
pub use typed_message::TypedMessage;
pub use validation::SchemaError;
