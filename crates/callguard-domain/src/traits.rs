//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the evidence pipeline and the
//! services it consults. Implementations live in other crates
//! (callguard-llm, callguard-store, callguard-filter).

use std::collections::HashMap;

/// Raw output of the pretrained text classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    /// One probability per label, in label-set order
    pub probabilities: Vec<f64>,

    /// Label the classifier reports as its argmax
    pub argmax_label: String,
}

/// Trait for the pretrained abusive-speech classifier
///
/// Implemented by the infrastructure layer (callguard-filter)
pub trait ClassifierOracle {
    /// Error type for classification
    type Error;

    /// Classify a single utterance
    fn classify(&self, text: &str) -> Result<ClassifierOutput, Self::Error>;
}

/// Trait for text embedding models
///
/// Implemented by the infrastructure layer (callguard-llm, callguard-store)
pub trait Embedder {
    /// Error type for embedding
    type Error;

    /// Embed text into a dense vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;
}

/// One ranked match returned by the retrieval service
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalMatch {
    /// Document metadata (category, legal reference, body, summary)
    pub metadata: HashMap<String, String>,

    /// Similarity score, higher is closer
    pub score: f32,
}

impl RetrievalMatch {
    /// First non-blank metadata value among `keys`, probed in order
    ///
    /// Documents were uploaded under several key spellings over time, so
    /// callers pass every known spelling in priority order.
    pub fn probe(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.metadata.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }
}

/// Trait for the vector-similarity retrieval service
///
/// Implemented by the infrastructure layer (callguard-store)
pub trait RetrievalService {
    /// Error type for queries
    type Error;

    /// Return up to `top_k` matches, best first
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>, Self::Error>;
}

/// A chat prompt: system instructions plus user content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,
}

impl Prompt {
    /// Create a prompt
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Trait for the generative completion service
///
/// Implemented by the infrastructure layer (callguard-llm)
pub trait CompletionService {
    /// Error type for completion
    type Error;

    /// Stream a completion, handing each text delta to `on_delta` in order
    ///
    /// Returns the accumulated text once the stream ends. An error means the
    /// stream terminated abnormally; deltas already delivered are not retracted.
    fn stream_completion(
        &self,
        prompt: &Prompt,
        on_delta: &mut dyn FnMut(&str),
    ) -> Result<String, Self::Error>;
}
