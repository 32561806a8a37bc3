//! Error types for fragment and index construction.
//!
//! The taxonomy is deliberately narrow: this crate only builds SQL text, so
//! almost every failure (unknown column, missing extension, bad custom
//! syntax) surfaces from the database at execution time, not here.

use thiserror::Error;

/// Errors raised while building SQL fragments or index statements.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A boost option that could not be interpreted at all (an empty
    /// option). A missing or malformed weight is recovered by defaulting
    /// to 1.0 and does not raise this error.
    #[error("invalid boost option: {message}")]
    InvalidBoost {
        /// Description of what was expected.
        message: String,
    },

    /// A lookup name that is not present in the registry.
    #[error("unknown lookup: {name}")]
    UnknownLookup {
        /// The name that failed to resolve.
        name: String,
    },

    /// A BM25 index declared with an empty field list.
    #[error("index {index} has no indexed fields")]
    NoIndexFields {
        /// The index name.
        index: String,
    },

    /// Failed to serialize the per-field tokenizer configuration.
    #[error("serialization error: {message}")]
    Serialization {
        /// The underlying serializer message.
        message: String,
    },
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;
