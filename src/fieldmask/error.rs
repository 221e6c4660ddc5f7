//! Error types for field mask operations.

use thiserror::Error;

use crate::parser::ParseError;

/// Error represents a failure while marshaling, parsing or converting masks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A single key could not be read from its text form.
    #[error("malformed FieldKey string {key:?}")]
    MalformedKey { key: String },

    /// The mask text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The mask has a wildcard branch and is not a single path.
    #[error("wildcard in the mask")]
    WildcardInMask,

    /// The mask branches and is not a single path.
    #[error("multiple paths in the mask")]
    MultiplePaths,
}

impl Error {
    /// Creates a malformed key error.
    pub fn malformed_key(key: impl Into<String>) -> Self {
        Error::MalformedKey { key: key.into() }
    }

    /// Returns true if the error comes from the mask text parser.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Returns true if the error is about a mask that is not a single path.
    pub fn is_structure(&self) -> bool {
        matches!(self, Error::WildcardInMask | Error::MultiplePaths)
    }
}

/// Result alias used across the field mask module.
pub type Result<T> = std::result::Result<T, Error>;
