//! Classification verdicts

use serde::Serialize;

/// The abusive / normal decision for one utterance
///
/// Produced once per classified text by the decision policy and never
/// mutated afterwards; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    is_abusive: bool,
    label: String,
    probabilities: Vec<f64>,
    forced_block: bool,
    matched_words: Vec<String>,
}

impl ClassificationVerdict {
    /// Create a verdict
    pub fn new(
        is_abusive: bool,
        label: impl Into<String>,
        probabilities: Vec<f64>,
        forced_block: bool,
        matched_words: Vec<String>,
    ) -> Self {
        Self {
            is_abusive,
            label: label.into(),
            probabilities,
            forced_block,
            matched_words,
        }
    }

    /// Whether the utterance is judged abusive
    pub fn is_abusive(&self) -> bool {
        self.is_abusive
    }

    /// Category label ("정상" for normal speech)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Class probabilities as reported (or synthesized for a forced block)
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// True when a force-block lexicon word decided the verdict
    pub fn forced_block(&self) -> bool {
        self.forced_block
    }

    /// Lexicon words found in the normalized text
    pub fn matched_words(&self) -> &[String] {
        &self.matched_words
    }
}
