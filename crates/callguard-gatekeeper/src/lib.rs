//! CallGuard Gatekeeper
//!
//! The last step before an answer leaves the service. It enforces the
//! allow-list of one response:
//!
//! - Legal-reference bullets survive only for references present in the
//!   fused evidence
//! - The headline names a single allowed category
//! - Vocabulary of categories the conversation does not license is replaced
//!   with neutral wording
//!
//! Violations are rewritten, never reported.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use callguard_domain::{AllowedCategorySet, EvidenceItem};
//! use callguard_gatekeeper::Sanitizer;
//! use callguard_lexicon::{tables, Lexicon};
//!
//! let sanitizer = Sanitizer::new(Arc::new(Lexicon::builtin()));
//! let evidence = vec![EvidenceItem::new(tables::THREAT, "형법 제283조")];
//! let allowed: AllowedCategorySet = [tables::THREAT].into_iter().collect();
//!
//! let text = "고객이 성희롱 발언을 했습니다.\n- **형법 제311조**: 모욕죄";
//! assert_eq!(sanitizer.sanitize(text, &evidence, &allowed), "고객이 폭언 발언을 했습니다.");
//! ```

#![warn(missing_docs)]

mod policy;
mod sanitizer;

pub use policy::{banned_keywords, primary_category, replacement_term, AllowPolicy, BannedKeyword};
pub use sanitizer::{headline, Sanitizer};
