//! Evidence items and origin-tagged batches

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel values that mean "no information" in any evidence source.
const PLACEHOLDERS: &[&str] = &["none", "unknown", "no-info", "없음", "정보없음"];

/// Returns true when `value` is empty or one of the placeholder sentinels.
///
/// # Examples
///
/// ```
/// use callguard_domain::is_placeholder;
///
/// assert!(is_placeholder("  "));
/// assert!(is_placeholder("None"));
/// assert!(is_placeholder("정보없음"));
/// assert!(!is_placeholder("형법 제283조"));
/// ```
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// A (category, legal reference) pair proposed as grounds for an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    /// Abuse category, e.g. "협박/폭행(폭언) 가능성"
    pub category: String,

    /// Legal reference, e.g. "형법 제283조"
    pub legal_reference: String,
}

impl EvidenceItem {
    /// Create a new evidence item (fields are trimmed)
    pub fn new(category: impl Into<String>, legal_reference: impl Into<String>) -> Self {
        Self {
            category: category.into().trim().to_string(),
            legal_reference: legal_reference.into().trim().to_string(),
        }
    }

    /// Both fields are present and neither is a placeholder
    pub fn is_valid(&self) -> bool {
        !is_placeholder(&self.category) && !is_placeholder(&self.legal_reference)
    }
}

/// The source an evidence batch came from
///
/// The declaration order is the fusion precedence: lexicon hits are
/// deterministic, retrieval hits come from curated reference data, and
/// model-asserted items may be hallucinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvidenceOrigin {
    /// Curated keyword tables
    Lexicon,
    /// Vector-similarity retrieval service
    Retrieval,
    /// Generative model output
    ModelAsserted,
}

impl EvidenceOrigin {
    /// Fusion rank, lower is merged first
    pub fn precedence(&self) -> u8 {
        match self {
            EvidenceOrigin::Lexicon => 0,
            EvidenceOrigin::Retrieval => 1,
            EvidenceOrigin::ModelAsserted => 2,
        }
    }

    /// Lower-case name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceOrigin::Lexicon => "lexicon",
            EvidenceOrigin::Retrieval => "retrieval",
            EvidenceOrigin::ModelAsserted => "model",
        }
    }
}

impl fmt::Display for EvidenceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of evidence items from a single origin
///
/// The origin is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceBatch {
    origin: EvidenceOrigin,
    items: Vec<EvidenceItem>,
}

impl EvidenceBatch {
    /// Create a batch from an origin and its items
    pub fn new(origin: EvidenceOrigin, items: Vec<EvidenceItem>) -> Self {
        Self { origin, items }
    }

    /// An empty batch
    pub fn empty(origin: EvidenceOrigin) -> Self {
        Self::new(origin, Vec::new())
    }

    /// Lexicon-derived batch
    pub fn lexicon(items: Vec<EvidenceItem>) -> Self {
        Self::new(EvidenceOrigin::Lexicon, items)
    }

    /// Retrieval-derived batch
    pub fn retrieval(items: Vec<EvidenceItem>) -> Self {
        Self::new(EvidenceOrigin::Retrieval, items)
    }

    /// Model-asserted batch
    pub fn model(items: Vec<EvidenceItem>) -> Self {
        Self::new(EvidenceOrigin::ModelAsserted, items)
    }

    /// Where this batch came from
    pub fn origin(&self) -> EvidenceOrigin {
        self.origin
    }

    /// Items in source order
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the batch carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the batch, yielding its items
    pub fn into_items(self) -> Vec<EvidenceItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("없음"));
        assert!(is_placeholder(" UNKNOWN "));
        assert!(is_placeholder("no-info"));
        assert!(!is_placeholder("형법 제311조"));
    }

    #[test]
    fn test_item_validity() {
        assert!(EvidenceItem::new("업무방해", "형법 제314조").is_valid());
        assert!(!EvidenceItem::new("", "형법 제314조").is_valid());
        assert!(!EvidenceItem::new("업무방해", "정보없음").is_valid());
    }

    #[test]
    fn test_item_fields_are_trimmed() {
        let item = EvidenceItem::new("  강요 ", " 형법 제324조\n");
        assert_eq!(item.category, "강요");
        assert_eq!(item.legal_reference, "형법 제324조");
    }

    #[test]
    fn test_origin_precedence_matches_ordering() {
        let mut origins = vec![
            EvidenceOrigin::ModelAsserted,
            EvidenceOrigin::Lexicon,
            EvidenceOrigin::Retrieval,
        ];
        origins.sort();
        assert_eq!(
            origins,
            vec![
                EvidenceOrigin::Lexicon,
                EvidenceOrigin::Retrieval,
                EvidenceOrigin::ModelAsserted
            ]
        );
        assert!(EvidenceOrigin::Lexicon.precedence() < EvidenceOrigin::ModelAsserted.precedence());
    }

    #[test]
    fn test_batch_keeps_origin() {
        let batch = EvidenceBatch::retrieval(vec![EvidenceItem::new("스토킹", "스토킹범죄의 처벌 등에 관한 법률 제18조")]);
        assert_eq!(batch.origin(), EvidenceOrigin::Retrieval);
        assert_eq!(batch.len(), 1);
        assert!(EvidenceBatch::empty(EvidenceOrigin::Lexicon).is_empty());
    }

    #[test]
    fn test_item_wire_shape() {
        let item = EvidenceItem::new("업무방해", "형법 제314조");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"category":"업무방해","legalReference":"형법 제314조"}"#);
    }
}
