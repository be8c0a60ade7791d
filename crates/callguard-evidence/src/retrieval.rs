//! Retrieval matches to prompt context and evidence

use callguard_domain::traits::RetrievalMatch;
use callguard_domain::{AllowedCategorySet, EvidenceBatch, EvidenceItem};
use tracing::debug;

const CATEGORY_KEYS: &[&str] = &["유형", "category"];
const REFERENCE_KEYS: &[&str] = &["관련 법률", "관련법률", "legalReference", "legal_reference"];
const BODY_KEYS: &[&str] = &["본문", "bodyText"];
const SUMMARY_KEYS: &[&str] = &["요약", "summary"];

/// Separator between context blocks in the prompt
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Retrieval matches turned into prompt context and a retrieval batch
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalContext {
    /// Rendered blocks for the prompt, one per kept match
    pub context_text: String,

    /// Evidence proposed by the kept matches
    pub batch: EvidenceBatch,
}

impl RetrievalContext {
    /// Context for a query that was never made
    pub fn empty() -> Self {
        Self {
            context_text: String::new(),
            batch: EvidenceBatch::retrieval(Vec::new()),
        }
    }

    /// True when no match survived
    pub fn is_empty(&self) -> bool {
        self.context_text.is_empty()
    }
}

/// Adapt ranked matches, skipping those outside an explicit allowed set
///
/// Missing fields render as empty strings in the context text. Evidence is
/// proposed only for matches carrying both a category and a reference; the
/// fuser filters placeholders later.
pub fn adapt_matches(matches: &[RetrievalMatch], allowed: &AllowedCategorySet) -> RetrievalContext {
    let mut blocks = Vec::new();
    let mut items = Vec::new();

    for m in matches {
        let category = m.probe(CATEGORY_KEYS).unwrap_or_default();
        if !allowed.is_unrestricted() && !allowed.contains(category) {
            debug!(category, score = m.score, "Skipping retrieval match outside allowed set");
            continue;
        }
        let reference = m.probe(REFERENCE_KEYS).unwrap_or_default();
        let body = m.probe(BODY_KEYS).unwrap_or_default();
        let summary = m.probe(SUMMARY_KEYS).unwrap_or_default();

        blocks.push(format!(
            "📌 **유형**: {}\n📖 본문: {}\n⚖ **관련 법률**: {}\n📝 요약: {}\n",
            category, body, reference, summary
        ));
        if !category.is_empty() && !reference.is_empty() {
            items.push(EvidenceItem::new(category, reference));
        }
    }

    RetrievalContext {
        context_text: blocks.join(CONTEXT_SEPARATOR),
        batch: EvidenceBatch::retrieval(items),
    }
}
