//! CallGuard Domain Layer
//!
//! This crate holds the value objects and collaborator traits shared by every
//! other CallGuard crate. It carries no infrastructure: HTTP clients, indexes,
//! and the pipeline itself live elsewhere and depend on this crate.
//!
//! ## Key Concepts
//!
//! - **Evidence item**: a (category, legal reference) pair proposed as grounds
//!   for the final answer
//! - **Evidence batch**: items tagged with the source that produced them
//!   (lexicon, retrieval, model)
//! - **Canonical reference**: a legal reference normalized for deduplication
//! - **Classification verdict**: the abusive / normal decision for one utterance
//! - **Allowed category set**: the categories a response may mention
//! - **Synthesized answer**: the fixed two-paragraph answer shape
//!
//! ## Architecture
//!
//! - Pure types and invariants only
//! - Trait definitions for every external service (see [`traits`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod answer;
pub mod category;
pub mod evidence;
pub mod reference;
pub mod request;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use answer::{AnswerPayload, SynthesizedAnswer};
pub use category::AllowedCategorySet;
pub use evidence::{is_placeholder, EvidenceBatch, EvidenceItem, EvidenceOrigin};
pub use reference::CanonicalReference;
pub use request::{ConsultRequest, RequestId, Speaker, TranscriptLine};
pub use verdict::ClassificationVerdict;
