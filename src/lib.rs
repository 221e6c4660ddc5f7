//! # Field Mask
//!
//! Field masks for partial updates and partial reads of structured messages.
//!
//! A mask is a tree of field names with wildcards, written in a compact text
//! form such as `spec.(max_size_bytes,versioning),labels.*`. Masks can be
//! merged, intersected and subtracted, matched against field paths, and
//! computed from a message for full update requests.
//!
//! ## Modules
//!
//! - [`fieldmask`] - Keys, paths and the mask tree with its algebra and text form
//! - [`parser`] - Lexer and parser for the mask text form
//! - [`message`] - Full update reset masks of structured messages
//! - [`schema`] - Declarative message types and JSON values checked against them
//! - [`metadata`] - Request metadata carrying the reset mask header

pub mod fieldmask;
pub mod message;
pub mod metadata;
pub mod parser;
pub mod schema;

pub use fieldmask::{Error, FieldKey, FieldPath, Mask, Result};
pub use message::{full_update_reset_mask, FieldValue, Message};
pub use metadata::{ensure_reset_mask, Metadata, RESET_MASK_HEADER};
pub use parser::{parse, parse_with_options, ParseError, ParseOptions};
pub use schema::{Schema, SchemaError, TypedMessage};
