//! Filter error types

use thiserror::Error;

/// Errors that can occur while classifying an utterance
#[derive(Error, Debug)]
pub enum FilterError {
    /// Classifier output does not fit the label set
    #[error("Malformed classifier output: {0}")]
    Malformed(String),

    /// Classifier could not be reached or answered with an error
    #[error("Classifier error: {0}")]
    Upstream(String),

    /// Label set is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}
