//! Evidence error types

use thiserror::Error;

/// Errors that can occur while interpreting evidence sources
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// Model output is not a JSON object of the expected shape
    #[error("Model output parse error: {0}")]
    Parse(String),
}
