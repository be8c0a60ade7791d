//! CallGuard LLM Provider Layer
//!
//! Completion and embedding clients behind the `CompletionService` and
//! `Embedder` traits from `callguard-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: scripted deltas and injected failures for tests
//! - `OllamaProvider`: local Ollama API (streaming chat + embeddings)
//!
//! # Examples
//!
//! ```
//! use callguard_llm::MockProvider;
//! use callguard_domain::traits::{CompletionService, Prompt};
//!
//! let provider = MockProvider::with_deltas(["안녕", "하세요"]);
//! let mut seen = Vec::new();
//! let full = provider
//!     .stream_completion(&Prompt::new("sys", "user"), &mut |d| seen.push(d.to_string()))
//!     .unwrap();
//! assert_eq!(full, "안녕하세요");
//! assert_eq!(seen, vec!["안녕", "하세요"]);
//! ```

#![warn(missing_docs)]

pub mod ollama;

use callguard_domain::traits::{CompletionService, Prompt};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Stream ended before the model signalled completion
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock completion provider for deterministic testing
///
/// Emits a scripted list of deltas. A failure can be injected after a given
/// number of deltas to simulate an abnormal stream end. Clones share the call
/// counter and the recorded prompts.
///
/// # Examples
///
/// ```
/// use callguard_llm::{LlmError, MockProvider};
/// use callguard_domain::traits::{CompletionService, Prompt};
///
/// let provider = MockProvider::with_deltas(["a", "b", "c"]).failing_after(2);
/// let mut seen = String::new();
/// let result = provider.stream_completion(&Prompt::default(), &mut |d| seen.push_str(d));
/// assert!(matches!(result, Err(LlmError::StreamInterrupted(_))));
/// assert_eq!(seen, "ab");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    deltas: Vec<String>,
    fail_after: Option<usize>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Stream `response` as a single delta
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_deltas([response.into()])
    }

    /// Stream the given deltas in order
    pub fn with_deltas<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deltas: deltas.into_iter().map(Into::into).collect(),
            fail_after: None,
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the stream after `n` deltas have been delivered
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Get the number of times a completion was requested
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or(0)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionService for MockProvider {
    type Error = LlmError;

    fn stream_completion(
        &self,
        prompt: &Prompt,
        on_delta: &mut dyn FnMut(&str),
    ) -> Result<String, Self::Error> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let mut full = String::new();
        for (i, delta) in self.deltas.iter().enumerate() {
            if self.fail_after == Some(i) {
                return Err(LlmError::StreamInterrupted(format!(
                    "mock stream cut after {} deltas",
                    i
                )));
            }
            on_delta(delta);
            full.push_str(delta);
        }
        if self.fail_after.is_some_and(|n| n >= self.deltas.len()) {
            return Err(LlmError::StreamInterrupted("mock stream cut at end".to_string()));
        }
        Ok(full)
    }
}
