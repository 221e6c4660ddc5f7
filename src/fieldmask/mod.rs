//! Field mask module - Masks, paths and keys for partial updates and reads.
//!
//! A [`Mask`] is a tree of field names with an optional wildcard branch at
//! each level. As a reset mask it names the fields a partial update must reset
//! to their defaults; as a select mask it names the fields a read should
//! return, where an empty mask selects everything.
//!
//! ```
//! use fieldmask::{FieldPath, Mask};
//!
//! let mut mask = FieldPath::from(vec!["spec", "max_size_bytes"]).to_mask();
//! mask += &FieldPath::from(vec!["spec", "versioning"]);
//! assert_eq!(mask.marshal(), "spec.(max_size_bytes,versioning)");
//!
//! let parsed: Mask = "spec.max_size_bytes,labels".parse().unwrap();
//! assert_eq!(parsed.marshal(), "labels,spec.max_size_bytes");
//! ```

mod error;
mod key;
mod mask;
mod path;
mod serialize;


pub use error::*;
pub use key::FieldKey;
pub use mask::*;
pub use path::*;
pub use serialize::*;

pub(crate) use key::is_plain_key_char;
