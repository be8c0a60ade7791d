//! CallGuard Synthesizer
//!
//! Shapes free model prose into the fixed answer format operators see:
//!
//! 1. Immediate-action guidance (the model's first paragraph, padded with
//!    escalation and recording advice when it has fewer than four sentences)
//! 2. A deterministic legal paragraph: a headline sentence naming the primary
//!    category and every reference, then one `- **reference**: brief` bullet
//!    per reference
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use callguard_domain::EvidenceItem;
//! use callguard_lexicon::Lexicon;
//! use callguard_synthesizer::Synthesizer;
//!
//! let synthesizer = Synthesizer::new(Arc::new(Lexicon::builtin()));
//! let evidence = vec![EvidenceItem::new("강요", "형법 제324조")];
//! let answer = synthesizer.synthesize("통화를 종료하세요.", &evidence).unwrap();
//!
//! assert!(answer.second().starts_with("당신이 상담한 내용은 **‘강요’**"));
//! assert_eq!(answer.render().split("\n\n").count(), 2);
//! ```

#![warn(missing_docs)]

mod error;
mod synthesizer;

pub use error::SynthesisError;
pub use synthesizer::{
    sentence_count, Synthesizer, DEFAULT_FIRST_PARAGRAPH, FIRST_PARAGRAPH_SUPPLEMENT,
    GENERIC_SECOND_PARAGRAPH, MIN_FIRST_SENTENCES,
};
