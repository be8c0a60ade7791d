//! Error types for the pipeline

use callguard_synthesizer::SynthesisError;
use thiserror::Error;

/// Errors that can occur while answering a request
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An upstream service (embedding, retrieval, completion) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The answer could not be shaped
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// An analysis request carried no transcript
    #[error("Transcript is empty")]
    EmptyTranscript,

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
