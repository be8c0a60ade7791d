//! Error types for lexicon loading

use thiserror::Error;

/// Errors that can occur while loading word lists
#[derive(Error, Debug)]
pub enum LexiconError {
    /// Word list file could not be read
    #[error("Failed to read word list {path}: {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Word list file is not valid JSON of the expected shape
    #[error("Invalid word list {path}: {source}")]
    Json {
        /// Path of the file
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Word list contains no usable entries
    #[error("Word list {0} is empty")]
    Empty(String),
}
