//! CallGuard Filter
//!
//! Abusive-speech decision policy wrapped around a pretrained classifier.
//!
//! The classifier oracle only reports label probabilities. This crate turns
//! them into a verdict:
//! - force-block lexicon words decide immediately, without the oracle
//! - a threshold / delta rule on the top abuse class and the normal class
//! - a false-positive correction when no lexicon word backs the prediction
//!
//! # Examples
//!
//! ```
//! use callguard_filter::{AbuseFilter, MockClassifier};
//! use callguard_lexicon::Lexicon;
//! use std::sync::Arc;
//!
//! let oracle = MockClassifier::fixed(vec![0.95, 0.01, 0.01, 0.03], "욕설");
//! let filter = AbuseFilter::new(oracle, Arc::new(Lexicon::builtin()));
//!
//! // Confident, but nothing in the lexicon supports it
//! let report = filter.filter("오늘 처리 안 되면 곤란합니다").unwrap();
//! assert!(!report.abuse);
//! assert_eq!(report.kind, "정상");
//! ```

#![warn(missing_docs)]

mod classifier;
mod error;
mod policy;

pub use classifier::{HttpClassifier, MockClassifier, DEFAULT_TIMEOUT_SECS};
pub use error::FilterError;
pub use policy::{
    decide, forced_verdict, AbuseFilter, FilterReport, LabelSet, ABUSE_THRESHOLD,
    DELTA_THRESHOLD, FORCED_LABEL, NORMAL_CEILING, UNSUPPORTED_ABUSE_FLOOR,
    UNSUPPORTED_NORMAL_CEILING,
};
