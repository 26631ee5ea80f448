//! Error types for the scoring adapter

use thiserror::Error;

/// Errors surfaced by the adapter.
///
/// Load-time errors (`ModelNotFound`, `ModelDeserialization`) are permanent:
/// the hosting server is expected to fail startup on them. Request-scoped
/// errors (`InvalidPayload`, `ShapeMismatch`) fail the single call and leave
/// the shared model handle untouched.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("model file '{filename}' not found in model directory {search_dir}")]
    ModelNotFound { filename: String, search_dir: String },

    #[error("failed to deserialize model '{filename}': {source}")]
    ModelDeserialization {
        filename: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("model is not loaded")]
    ModelNotLoaded,

    #[error("invalid feature payload: {0}")]
    InvalidPayload(String),

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
