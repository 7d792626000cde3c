//! Error types for the form engine and document loader.

use thiserror::Error;

/// Errors raised by field path handling, array mutators and document loading.
///
/// Mutators hand these back to the caller exactly as the engine produced them.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("field {0} is not an array")]
    NotAnArray(String),

    #[error("field {path} cannot hold child {segment:?}")]
    NotAContainer { path: String, segment: String },

    #[error("index {index} out of range for {path} (len {len})")]
    IndexOutOfRange { path: String, index: usize, len: usize },

    #[error("{0} used outside a block collection")]
    OutsideCollection(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
