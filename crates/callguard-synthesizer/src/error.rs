//! Synthesizer error types

use thiserror::Error;

/// Errors that can occur during answer synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The assembled paragraphs violate the two-paragraph shape
    #[error("Answer shape violated: {0}")]
    Shape(String),
}
