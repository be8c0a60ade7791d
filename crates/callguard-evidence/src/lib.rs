//! CallGuard Evidence
//!
//! Turns the three evidence sources into one canonical, deduplicated list.
//!
//! # Pipeline
//!
//! ```text
//! lexicon hints ─────┐
//! retrieval matches ─┼─► fuse (precedence, split, canonicalize, dedup, cap) ─► Vec<EvidenceItem>
//! model JSON reply ──┘
//! ```
//!
//! Retrieval matches are adapted with [`adapt_matches`], the model reply is
//! interpreted with [`interpret_model_output`]. Both produce origin-tagged
//! [`EvidenceBatch`](callguard_domain::EvidenceBatch)es that [`fuse`] orders by
//! precedence regardless of how they are passed.
//!
//! # Example
//!
//! ```
//! use callguard_domain::EvidenceBatch;
//! use callguard_evidence::{fuse, interpret_model_output, DEFAULT_EVIDENCE_LIMIT};
//! use callguard_lexicon::Lexicon;
//!
//! let lexicon = Lexicon::builtin();
//! let hints = EvidenceBatch::lexicon(lexicon.keyword_hints("죽여버린다고 협박했어요", 5));
//! let reply = interpret_model_output(
//!     r#"{"answer": "통화를 종료하세요.", "sourcePages": [{"유형": "협박", "관련법률": "형법 제283조 (협박)"}]}"#,
//!     "관련법률",
//!     DEFAULT_EVIDENCE_LIMIT,
//! );
//!
//! let evidence = fuse(vec![reply.batch, hints], DEFAULT_EVIDENCE_LIMIT);
//! assert_eq!(evidence[0].legal_reference, "형법 제283조");
//! ```

#![warn(missing_docs)]

mod canonical;
mod error;
mod fuse;
mod model_output;
mod retrieval;

pub use canonical::{canonicalize, split_references};
pub use error::EvidenceError;
pub use fuse::{filter_by_allowed, format_evidence_text, fuse, DEFAULT_EVIDENCE_LIMIT};
pub use model_output::{interpret_model_output, law_mention_batch, parse_model_output, ModelReply};
pub use retrieval::{adapt_matches, RetrievalContext, CONTEXT_SEPARATOR};
