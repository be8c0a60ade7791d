//! CallGuard Lexicon
//!
//! Curated keyword tables and the deterministic matchers built on them.
//!
//! The lexicon is the first and most trusted evidence source: it maps caller
//! vocabulary to abuse categories and legal references, holds the profanity
//! word lists used by the classifier decision policy, and carries the
//! reference-to-brief table used when the answer's legal paragraph is written.
//!
//! # Architecture
//!
//! ```text
//! builtin tables / JSON word lists → Lexicon (immutable) → &Lexicon in pure functions
//! ```
//!
//! A [`Lexicon`] is built once at process start and shared by reference
//! (usually behind an `Arc`). Nothing mutates it afterwards.
//!
//! # Example
//!
//! ```
//! use callguard_lexicon::Lexicon;
//!
//! let lexicon = Lexicon::builtin();
//! let hints = lexicon.keyword_hints("고객이 계속 협박을 합니다", 5);
//! assert_eq!(hints[0].legal_reference, "형법 제283조; 형법 제260조");
//! ```

#![warn(missing_docs)]

mod error;
mod lexicon;
mod patterns;
pub mod tables;

pub use error::LexiconError;
pub use lexicon::{CategoryKeywords, Lexicon};
pub use patterns::{detect_abuse_types, extract_law_mentions, looks_like_legal_reference, AbuseType};
