//! Precedence-ordered evidence fusion

use crate::canonical::{canonicalize, split_references};
use callguard_domain::{is_placeholder, AllowedCategorySet, EvidenceBatch, EvidenceItem};
use std::collections::HashSet;
use tracing::debug;

/// Default maximum number of fused evidence items
pub const DEFAULT_EVIDENCE_LIMIT: usize = 3;

/// Merge origin-tagged batches into a deduplicated, capped evidence list
///
/// Batches are stably ordered by origin precedence (lexicon, retrieval,
/// model) whatever order they arrive in. Each reference string is split into
/// its parts, canonicalized and deduplicated by canonical reference alone;
/// the first category seen for a reference wins. At most `limit` items are
/// returned.
///
/// # Examples
///
/// ```
/// use callguard_domain::{EvidenceBatch, EvidenceItem};
/// use callguard_evidence::fuse;
///
/// let model = EvidenceBatch::model(vec![EvidenceItem::new("모욕", "형법 제311조(모욕)")]);
/// let lexicon = EvidenceBatch::lexicon(vec![EvidenceItem::new("협박", "형법 제283조; 형법 제311조")]);
///
/// let fused = fuse(vec![model, lexicon], 3);
/// assert_eq!(fused.len(), 2);
/// assert_eq!(fused[1], EvidenceItem::new("협박", "형법 제311조"));
/// ```
pub fn fuse(mut batches: Vec<EvidenceBatch>, limit: usize) -> Vec<EvidenceItem> {
    batches.sort_by_key(|b| b.origin().precedence());

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    if limit == 0 {
        return out;
    }

    for batch in &batches {
        for item in batch.items() {
            if !item.is_valid() {
                continue;
            }
            for part in split_references(&item.legal_reference) {
                let reference = canonicalize(part);
                if reference.is_empty() || is_placeholder(reference.as_str()) {
                    continue;
                }
                if !seen.insert(reference.key().to_string()) {
                    continue;
                }
                out.push(EvidenceItem::new(item.category.clone(), reference.into_string()));
                if out.len() >= limit {
                    debug!(origin = %batch.origin(), limit, "Evidence limit reached");
                    return out;
                }
            }
        }
    }
    out
}

/// Drop evidence whose category is outside an explicit allowed set
///
/// An unrestricted (empty) set keeps everything.
pub fn filter_by_allowed(items: Vec<EvidenceItem>, allowed: &AllowedCategorySet) -> Vec<EvidenceItem> {
    if allowed.is_unrestricted() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| allowed.contains(&item.category))
        .collect()
}

/// `- 유형: …\n- 관련법률: …` blocks joined by blank lines
pub fn format_evidence_text(items: &[EvidenceItem]) -> String {
    items
        .iter()
        .filter(|item| !item.category.is_empty() && !item.legal_reference.is_empty())
        .map(|item| format!("- 유형: {}\n- 관련법률: {}", item.category, item.legal_reference))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, reference: &str) -> EvidenceItem {
        EvidenceItem::new(category, reference)
    }

    #[test]
    fn test_precedence_ignores_argument_order() {
        let lexicon = EvidenceBatch::lexicon(vec![item("협박", "형법 제283조")]);
        let retrieval = EvidenceBatch::retrieval(vec![item("모욕", "형법 제283조")]);
        let model = EvidenceBatch::model(vec![item("업무방해", "형법 제283조 (협박)")]);

        let fused = fuse(vec![model, retrieval, lexicon], 3);
        assert_eq!(fused, vec![item("협박", "형법 제283조")]);
    }

    #[test]
    fn test_placeholders_rejected() {
        let retrieval = EvidenceBatch::retrieval(vec![
            item("정보없음", "형법 제283조"),
            item("협박", "없음"),
            item("협박", "(삭제됨); none; 형법 제260조"),
        ]);
        let fused = fuse(vec![retrieval], 3);
        assert_eq!(fused, vec![item("협박", "형법 제260조")]);
    }

    #[test]
    fn test_limit_and_split() {
        let lexicon = EvidenceBatch::lexicon(vec![
            item("협박/폭행(폭언) 가능성", "형법 제283조; 형법 제260조"),
            item("명예훼손·모욕·폭언", "형법 제307조; 형법 제311조"),
        ]);
        let fused = fuse(vec![lexicon], 3);
        let refs: Vec<&str> = fused.iter().map(|i| i.legal_reference.as_str()).collect();
        assert_eq!(refs, vec!["형법 제283조", "형법 제260조", "형법 제307조"]);
        assert!(fuse(vec![EvidenceBatch::lexicon(vec![item("a", "b")])], 0).is_empty());
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first_display() {
        let retrieval = EvidenceBatch::retrieval(vec![item("x", "Criminal Act 283")]);
        let model = EvidenceBatch::model(vec![item("y", "CRIMINAL ACT 283")]);
        let fused = fuse(vec![retrieval, model], 3);
        assert_eq!(fused, vec![item("x", "Criminal Act 283")]);
    }

    #[test]
    fn test_filter_by_allowed() {
        let items = vec![item("협박", "a"), item("성희롱", "b")];
        let allowed: AllowedCategorySet = ["협박"].into_iter().collect();
        assert_eq!(filter_by_allowed(items.clone(), &allowed), vec![item("협박", "a")]);
        assert_eq!(filter_by_allowed(items.clone(), &AllowedCategorySet::new()), items);
    }

    #[test]
    fn test_format_evidence_text() {
        let text = format_evidence_text(&[item("협박", "형법 제283조"), item("강요", "형법 제324조")]);
        assert_eq!(
            text,
            "- 유형: 협박\n- 관련법률: 형법 제283조\n\n- 유형: 강요\n- 관련법률: 형법 제324조"
        );
        assert_eq!(format_evidence_text(&[]), "");
    }
}
