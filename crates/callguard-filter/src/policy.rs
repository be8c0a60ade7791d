//! Threshold / delta / override decision rules

use crate::error::FilterError;
use callguard_domain::traits::{ClassifierOracle, ClassifierOutput};
use callguard_domain::ClassificationVerdict;
use callguard_lexicon::Lexicon;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum top abuse-class probability
pub const ABUSE_THRESHOLD: f64 = 0.9;

/// Minimum margin of the top abuse class over the normal class
pub const DELTA_THRESHOLD: f64 = 0.2;

/// Normal-class probability must stay below this
pub const NORMAL_CEILING: f64 = 0.3;

/// Without a lexicon match, abuse below this is downgraded
pub const UNSUPPORTED_ABUSE_FLOOR: f64 = 0.97;

/// Without a lexicon match, normal above this is downgraded
pub const UNSUPPORTED_NORMAL_CEILING: f64 = 0.2;

/// Label reported for force-blocked utterances
pub const FORCED_LABEL: &str = "욕설(강제차단)";

/// Classifier label names and the position of the normal class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
    normal_index: usize,
}

impl LabelSet {
    /// Create a label set, checking the normal index
    pub fn new(names: Vec<String>, normal_index: usize) -> Result<Self, FilterError> {
        if names.len() < 2 {
            return Err(FilterError::Config(format!(
                "need at least two labels, got {}",
                names.len()
            )));
        }
        if normal_index >= names.len() {
            return Err(FilterError::Config(format!(
                "normal index {} out of range for {} labels",
                normal_index,
                names.len()
            )));
        }
        Ok(Self {
            names,
            normal_index,
        })
    }

    /// Label names in classifier order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the normal class
    pub fn normal_index(&self) -> usize {
        self.normal_index
    }

    /// Name of the normal class
    pub fn normal_label(&self) -> &str {
        &self.names[self.normal_index]
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; a label set has at least two labels
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            names: ["욕설", "성희롱", "협박", "정상"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            normal_index: 3,
        }
    }
}

/// Wire shape of the standalone filter operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    /// Final abusive decision
    pub abuse: bool,
    /// Whether any lexicon word matched
    pub detected: bool,
    /// Verdict label
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&ClassificationVerdict> for FilterReport {
    fn from(verdict: &ClassificationVerdict) -> Self {
        Self {
            abuse: verdict.is_abusive(),
            detected: !verdict.matched_words().is_empty(),
            kind: verdict.label().to_string(),
        }
    }
}

/// Verdict for an utterance containing a force-block word
pub fn forced_verdict(labels: &LabelSet, matched: Vec<String>) -> ClassificationVerdict {
    let mut probabilities = vec![0.0; labels.len()];
    probabilities[0] = 1.0;
    ClassificationVerdict::new(true, FORCED_LABEL, probabilities, true, matched)
}

/// Apply the threshold, delta and correction rules to classifier output
///
/// `matched` is the lexicon match list for the same utterance. The oracle's
/// reported label decides ties between abuse classes.
pub fn decide(
    output: &ClassifierOutput,
    matched: Vec<String>,
    labels: &LabelSet,
) -> Result<ClassificationVerdict, FilterError> {
    let probs = &output.probabilities;
    if probs.len() != labels.len() {
        return Err(FilterError::Malformed(format!(
            "expected {} probabilities, got {}",
            labels.len(),
            probs.len()
        )));
    }
    if let Some(bad) = probs.iter().find(|p| !p.is_finite()) {
        return Err(FilterError::Malformed(format!("non-finite probability {}", bad)));
    }

    let predicted = predicted_label(output, labels);
    let normal = probs[labels.normal_index()];
    let max_abuse = probs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != labels.normal_index())
        .map(|(_, p)| *p)
        .fold(f64::NEG_INFINITY, f64::max);
    let delta = max_abuse - normal;

    let mut is_abusive = predicted != labels.normal_label()
        && max_abuse > ABUSE_THRESHOLD
        && delta > DELTA_THRESHOLD
        && normal < NORMAL_CEILING;

    if is_abusive
        && matched.is_empty()
        && (max_abuse < UNSUPPORTED_ABUSE_FLOOR || normal > UNSUPPORTED_NORMAL_CEILING)
    {
        debug!(max_abuse, normal, "Downgraded unsupported abuse prediction");
        is_abusive = false;
    }

    if !is_abusive && matched.is_empty() {
        return Ok(ClassificationVerdict::new(
            false,
            labels.normal_label(),
            probs.clone(),
            false,
            Vec::new(),
        ));
    }

    Ok(ClassificationVerdict::new(
        is_abusive,
        predicted,
        probs.clone(),
        false,
        matched,
    ))
}

fn predicted_label<'a>(output: &'a ClassifierOutput, labels: &'a LabelSet) -> &'a str {
    let reported = output.argmax_label.trim();
    if !reported.is_empty() {
        return reported;
    }
    let mut best = 0;
    for (i, p) in output.probabilities.iter().enumerate() {
        if *p > output.probabilities[best] {
            best = i;
        }
    }
    &labels.names()[best]
}

/// Lexicon override in front of a classifier oracle
///
/// # Examples
///
/// ```
/// use callguard_filter::{AbuseFilter, MockClassifier};
/// use callguard_lexicon::Lexicon;
/// use std::sync::Arc;
///
/// let filter = AbuseFilter::new(MockClassifier::normal(), Arc::new(Lexicon::builtin()));
/// let verdict = filter.classify("씨발 진짜").unwrap();
/// assert!(verdict.is_abusive());
/// assert!(verdict.forced_block());
/// ```
pub struct AbuseFilter<C> {
    oracle: C,
    lexicon: Arc<Lexicon>,
    labels: LabelSet,
}

impl<C> AbuseFilter<C>
where
    C: ClassifierOracle,
    C::Error: Display,
{
    /// Create a filter with the default label set
    pub fn new(oracle: C, lexicon: Arc<Lexicon>) -> Self {
        Self::with_labels(oracle, lexicon, LabelSet::default())
    }

    /// Create a filter with a custom label set
    pub fn with_labels(oracle: C, lexicon: Arc<Lexicon>, labels: LabelSet) -> Self {
        Self {
            oracle,
            lexicon,
            labels,
        }
    }

    /// Label set in use
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Classify one utterance
    ///
    /// A force-block match decides without calling the oracle.
    pub fn classify(&self, text: &str) -> Result<ClassificationVerdict, FilterError> {
        let normalized = Lexicon::normalize(text);
        let matched = self.lexicon.matched_badwords(&normalized);

        if matched.iter().any(|w| self.lexicon.is_force_block(w)) {
            debug!(matched = matched.len(), "Force-block word matched");
            return Ok(forced_verdict(&self.labels, matched));
        }

        let output = self.oracle.classify(text).map_err(|e| {
            warn!(error = %e, "Classifier call failed");
            FilterError::Upstream(e.to_string())
        })?;

        decide(&output, matched, &self.labels)
    }

    /// Classify and reduce to the `{abuse, detected, type}` report
    pub fn filter(&self, text: &str) -> Result<FilterReport, FilterError> {
        self.classify(text).map(|v| FilterReport::from(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockClassifier;

    fn output(probs: &[f64], label: &str) -> ClassifierOutput {
        ClassifierOutput {
            probabilities: probs.to_vec(),
            argmax_label: label.to_string(),
        }
    }

    fn filter_with(mock: MockClassifier) -> AbuseFilter<MockClassifier> {
        AbuseFilter::new(mock, Arc::new(Lexicon::builtin()))
    }

    #[test]
    fn test_force_block_overrides_normal_probabilities() {
        let mock = MockClassifier::fixed(vec![0.1, 0.1, 0.1, 0.7], "정상");
        let filter = filter_with(mock.clone());

        let verdict = filter.classify("야 씨발 뭐하냐").unwrap();
        assert!(verdict.is_abusive());
        assert!(verdict.forced_block());
        assert_eq!(verdict.label(), FORCED_LABEL);
        assert_eq!(verdict.probabilities(), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_unsupported_prediction_downgraded() {
        let verdict = decide(
            &output(&[0.95, 0.01, 0.01, 0.03], "욕설"),
            Vec::new(),
            &LabelSet::default(),
        )
        .unwrap();
        assert!(!verdict.is_abusive());
        assert_eq!(verdict.label(), "정상");
        assert!(verdict.matched_words().is_empty());
    }

    #[test]
    fn test_high_confidence_without_lexicon_stays_abusive() {
        let verdict = decide(
            &output(&[0.01, 0.98, 0.0, 0.01], "성희롱"),
            Vec::new(),
            &LabelSet::default(),
        )
        .unwrap();
        assert!(verdict.is_abusive());
        assert_eq!(verdict.label(), "성희롱");
    }

    #[test]
    fn test_lexicon_match_skips_correction() {
        let verdict = decide(
            &output(&[0.95, 0.01, 0.01, 0.03], "욕설"),
            vec!["병신".to_string()],
            &LabelSet::default(),
        )
        .unwrap();
        assert!(verdict.is_abusive());
        assert_eq!(verdict.matched_words(), &["병신".to_string()]);
    }

    #[test]
    fn test_non_abusive_with_lexicon_keeps_oracle_label() {
        let verdict = decide(
            &output(&[0.3, 0.0, 0.0, 0.7], "정상"),
            vec!["미친".to_string()],
            &LabelSet::default(),
        )
        .unwrap();
        assert!(!verdict.is_abusive());
        assert_eq!(verdict.label(), "정상");
        assert_eq!(verdict.matched_words().len(), 1);

        let verdict = decide(
            &output(&[0.6, 0.0, 0.0, 0.4], "욕설"),
            vec!["미친".to_string()],
            &LabelSet::default(),
        )
        .unwrap();
        assert!(!verdict.is_abusive());
        assert_eq!(verdict.label(), "욕설");
    }

    #[test]
    fn test_normal_argmax_never_abusive() {
        let verdict = decide(
            &output(&[0.95, 0.0, 0.0, 0.05], "정상"),
            vec!["미친".to_string()],
            &LabelSet::default(),
        )
        .unwrap();
        assert!(!verdict.is_abusive());
    }

    #[test]
    fn test_malformed_output() {
        let labels = LabelSet::default();
        assert!(matches!(
            decide(&output(&[0.5, 0.5], "욕설"), Vec::new(), &labels),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            decide(&output(&[f64::NAN, 0.0, 0.0, 1.0], "정상"), Vec::new(), &labels),
            Err(FilterError::Malformed(_))
        ));
    }

    #[test]
    fn test_blank_label_falls_back_to_argmax() {
        let verdict = decide(
            &output(&[0.0, 0.0, 0.99, 0.01], ""),
            Vec::new(),
            &LabelSet::default(),
        )
        .unwrap();
        assert!(verdict.is_abusive());
        assert_eq!(verdict.label(), "협박");
    }

    #[test]
    fn test_label_set_validation() {
        assert!(LabelSet::new(vec!["정상".into()], 0).is_err());
        assert!(LabelSet::new(vec!["a".into(), "b".into()], 2).is_err());
        let labels = LabelSet::new(vec!["abuse".into(), "normal".into()], 1).unwrap();
        assert_eq!(labels.normal_label(), "normal");
    }

    #[test]
    fn test_upstream_failure() {
        let filter = filter_with(MockClassifier::failing("connection refused"));
        assert!(matches!(
            filter.classify("안녕하세요"),
            Err(FilterError::Upstream(_))
        ));
    }

    #[test]
    fn test_filter_report() {
        let filter = filter_with(MockClassifier::normal());
        let report = filter.filter("요금제 변경하고 싶어요").unwrap();
        assert_eq!(
            report,
            FilterReport {
                abuse: false,
                detected: false,
                kind: "정상".to_string()
            }
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "정상");
    }
}
