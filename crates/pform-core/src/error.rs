//! # Error Types
//!
//! Programming and IO errors shared across pform. User-facing validation
//! failures are not errors in this sense; they travel as data in
//! `pform_schema::ValidationErrors`.

use thiserror::Error;

/// Top-level error type for pform.
#[derive(Error, Debug)]
pub enum PformError {
    /// A field path could not be parsed or does not fit the value tree.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath {
        /// The offending path as written.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// An array index was outside the bounds of the target array.
    #[error("index {index} out of range for '{path}' (len {len})")]
    IndexOutOfRange {
        /// Path of the array.
        path: String,
        /// Requested index.
        index: usize,
        /// Current array length.
        len: usize,
    },

    /// The value at a path was expected to be an array.
    #[error("value at '{path}' is not an array")]
    NotAnArray {
        /// Path of the non-array value.
        path: String,
    },

    /// Default values must be a JSON object keyed by field name.
    #[error("default values must be an object, got {found}")]
    InvalidDefaults {
        /// JSON type of the rejected value.
        found: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
