//! Store error types

use thiserror::Error;

/// Errors that can occur in session or retrieval storage
#[derive(Error, Debug)]
pub enum StoreError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Invalid input to an embedding or index call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote index could not be reached or answered with an error
    #[error("Index request failed: {0}")]
    Http(String),

    /// Remote index answered with an unexpected body
    #[error("Invalid index response: {0}")]
    InvalidResponse(String),

    /// Document file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document file is not valid JSON
    #[error("Invalid documents file {path}: {source}")]
    Json {
        /// Path of the file
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Embedding a document failed
    #[error("Embedding failed: {0}")]
    Embedding(String),
}
