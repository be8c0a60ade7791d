//! Answer shapes: the two-paragraph answer and the final payload

use crate::EvidenceItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opening words of the second paragraph's headline sentence
///
/// The synthesizer writes it and the sanitizer recognizes headline lines by it.
pub const HEADLINE_MARKER: &str = "당신이 상담한 내용은";

/// Answer returned when any upstream fault cannot be recovered
pub const FALLBACK_ANSWER: &str = "일시적 오류가 발생했습니다.";

/// Exactly two non-empty paragraphs
///
/// Neither paragraph contains a blank line, so rendering with a single blank
/// line separator always yields two paragraphs again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAnswer {
    first: String,
    second: String,
}

impl SynthesizedAnswer {
    /// Build an answer, rejecting empty paragraphs or embedded blank lines
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Result<Self, String> {
        let first = first.into().trim().to_string();
        let second = second.into().trim().to_string();
        for (name, paragraph) in [("first", &first), ("second", &second)] {
            if paragraph.is_empty() {
                return Err(format!("{} paragraph is empty", name));
            }
            if has_blank_line(paragraph) {
                return Err(format!("{} paragraph contains a blank line", name));
            }
        }
        Ok(Self { first, second })
    }

    /// Immediate-action paragraph
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Category / legal-reference paragraph
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Paragraphs joined by a blank line
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.first, self.second)
    }
}

impl fmt::Display for SynthesizedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.first, self.second)
    }
}

fn has_blank_line(text: &str) -> bool {
    text.lines().any(|line| line.trim().is_empty())
}

/// The final message of every response stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    /// Sanitized answer text
    pub answer: String,

    /// Fused, allow-listed evidence
    pub evidence: Vec<EvidenceItem>,

    /// Human-readable rendering of `evidence`
    pub evidence_text: String,
}

impl AnswerPayload {
    /// Create a payload
    pub fn new(answer: impl Into<String>, evidence: Vec<EvidenceItem>, evidence_text: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            evidence,
            evidence_text: evidence_text.into(),
        }
    }

    /// A payload that carries text only
    pub fn text_only(answer: impl Into<String>) -> Self {
        Self::new(answer, Vec::new(), String::new())
    }

    /// The generic apology returned after an unrecoverable fault
    pub fn fallback() -> Self {
        Self::text_only(FALLBACK_ANSWER)
    }
}
