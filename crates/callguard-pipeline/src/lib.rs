//! CallGuard Pipeline
//!
//! Orchestrates one request end to end:
//!
//! ```text
//! question + transcript
//!   → lexicon hints, allowed categories
//!   → retrieval (embed + query)
//!   → prompt → streamed completion (deltas forwarded)
//!   → model output parsing
//!   → fuse(lexicon, retrieval, model) → synthesize → sanitize
//!   → final payload
//! ```
//!
//! Upstream calls run on the blocking thread pool. Every failure after the
//! request is accepted ends the stream with the static fallback payload, so a
//! caller always receives exactly one [`StreamEvent::Final`].
//!
//! Session memory for consultations is held in a
//! [`SessionStore`](callguard_store::SessionStore); a session's lock is held
//! from prompt construction until the answer is appended, so requests on one
//! session are answered one at a time.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use callguard_domain::ConsultRequest;
//! use callguard_lexicon::Lexicon;
//! use callguard_llm::MockProvider;
//! use callguard_pipeline::{Pipeline, PipelineConfig};
//! use callguard_store::{LocalIndex, MockEmbeddingModel};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     MockProvider::new(r#"{"answer": "녹취를 보존하세요.", "sourcePages": []}"#),
//!     MockEmbeddingModel::new(64),
//!     LocalIndex::new(64),
//!     Arc::new(Lexicon::builtin()),
//!     PipelineConfig::default(),
//! )?;
//!
//! let (tx, mut rx) = mpsc::channel(64);
//! let payload = pipeline
//!     .consult(ConsultRequest::new("call-1", "고객이 협박했어요"), tx)
//!     .await;
//! while let Some(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! println!("{}", payload.answer);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyze;
mod config;
mod consult;
mod error;
mod events;
mod pipeline;
mod prompt;

pub use analyze::PLAIN_CALL_ANSWER;
pub use config::PipelineConfig;
pub use consult::{CALLER_WORDS_HEADER, NO_CALLER_WORDS};
pub use error::PipelineError;
pub use events::StreamEvent;
pub use pipeline::{session_key, Pipeline};
pub use prompt::{analysis_prompt, is_blank_transcript, transcript_text, ConsultPromptBuilder};
