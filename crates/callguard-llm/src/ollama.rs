//! Ollama Provider Implementation
//!
//! Streams chat completions from `/api/chat` (newline-delimited JSON) and
//! fetches embeddings from `/api/embeddings`.
//!
//! The client is blocking; async callers run it on `spawn_blocking`.
//!
//! # Examples
//!
//! ```no_run
//! use callguard_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3", "nomic-embed-text").unwrap();
//! ```

use crate::LlmError;
use callguard_domain::traits::{CompletionService, Embedder, Prompt};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts for embedding requests
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local completion and embedding models
#[derive(Clone)]
pub struct OllamaProvider {
    endpoint: String,
    chat_model: String,
    embed_model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

/// One NDJSON line of a streaming chat response
#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `chat_model`: completion model
    /// - `embed_model`: embedding model
    pub fn new(
        endpoint: impl Into<String>,
        chat_model: impl Into<String>,
        embed_model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(
            endpoint,
            chat_model,
            embed_model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        chat_model: impl Into<String>,
        embed_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            chat_model: chat_model.into(),
            embed_model: embed_model.into(),
            temperature: 0.2,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts for embedding requests
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn embed_once(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.embed_model,
                prompt: text,
            })
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.embed_model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        if parsed.embedding.is_empty() {
            return Err(LlmError::InvalidResponse("empty embedding".to_string()));
        }
        Ok(parsed.embedding)
    }
}

impl Embedder for OllamaProvider {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        let mut attempts = 0;
        loop {
            match self.embed_once(text) {
                Ok(vector) => return Ok(vector),
                Err(LlmError::Communication(msg)) => {
                    attempts += 1;
                    if attempts >= self.max_retries {
                        return Err(LlmError::Communication(msg));
                    }
                    // Exponential backoff: 1s, 2s, 4s, etc.
                    let delay = Duration::from_secs(2u64.pow(attempts - 1));
                    warn!(attempt = attempts, error = %msg, "Embedding request failed, retrying");
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl CompletionService for OllamaProvider {
    type Error = LlmError;

    fn stream_completion(
        &self,
        prompt: &Prompt,
        on_delta: &mut dyn FnMut(&str),
    ) -> Result<String, Self::Error> {
        let url = format!("{}/api/chat", self.endpoint);
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.trim().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &prompt.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });
        let body = ChatRequest {
            model: &self.chat_model,
            messages,
            stream: true,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.chat_model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        read_chat_stream(BufReader::new(response), on_delta)
    }
}

/// Consume NDJSON chat chunks, forwarding each non-empty content delta
fn read_chat_stream<R: BufRead>(
    reader: R,
    on_delta: &mut dyn FnMut(&str),
) -> Result<String, LlmError> {
    let mut full = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| LlmError::StreamInterrupted(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: ChatChunk = serde_json::from_str(&line)
            .map_err(|e| LlmError::InvalidResponse(format!("Bad stream chunk: {}", e)))?;
        if let Some(error) = chunk.error {
            return Err(LlmError::StreamInterrupted(error));
        }
        if let Some(message) = chunk.message {
            if !message.content.is_empty() {
                on_delta(&message.content);
                full.push_str(&message.content);
            }
        }
        if chunk.done {
            debug!(chars = full.chars().count(), "Completion stream finished");
            return Ok(full);
        }
    }
    Err(LlmError::StreamInterrupted(
        "stream closed before done marker".to_string(),
    ))
}
