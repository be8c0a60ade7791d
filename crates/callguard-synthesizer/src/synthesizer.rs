//! Two-paragraph answer assembly

use crate::error::SynthesisError;
use callguard_domain::answer::HEADLINE_MARKER;
use callguard_domain::{EvidenceItem, SynthesizedAnswer};
use callguard_evidence::canonicalize;
use callguard_lexicon::Lexicon;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// First paragraph used when the model produced no prose
pub const DEFAULT_FIRST_PARAGRAPH: &str =
    "상황 기록, 증거 보존, 상급자 보고, 심리 안정 확보 등 즉시 조치를 진행하세요.";

/// Appended to a first paragraph with too few sentences
pub const FIRST_PARAGRAPH_SUPPLEMENT: &str = " 통화 선종료·차단 기준을 숙지하고, 재발 방지를 위한 안내 멘트를 사용하세요. 내부 시스템에 시간/상황/발언을 구체 기록하고 즉시 보호조치를 요청하세요.";

/// Second paragraph when no evidence survived fusion
pub const GENERIC_SECOND_PARAGRAPH: &str = "당신이 상담한 내용은 **‘해당 유형’**에 해당할 수 있으며, 관련 법률로는 **‘해당 법률’**이 있습니다.\n각 법률의 적용은 상황에 따라 달라질 수 있으니 기관 지침과 법률 자문을 함께 참고하세요.";

/// Minimum sentence count of a sufficient first paragraph
pub const MIN_FIRST_SENTENCES: usize = 4;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.。]\s*").unwrap());

/// Builds the fixed two-paragraph answer from model prose and fused evidence
///
/// The first paragraph is the model's immediate-action guidance, padded when
/// it is too thin. The second paragraph is always written here from the
/// evidence, never taken from the model.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    lexicon: Arc<Lexicon>,
}

impl Synthesizer {
    /// Create a synthesizer that takes legal briefs from `lexicon`
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Assemble the answer
    ///
    /// Paragraphs after the first in `raw` are discarded; a second paragraph
    /// from the model is replaced unconditionally.
    pub fn synthesize(
        &self,
        raw: &str,
        evidence: &[EvidenceItem],
    ) -> Result<SynthesizedAnswer, SynthesisError> {
        let paragraphs: Vec<&str> = PARAGRAPH_BREAK
            .split(raw.trim())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        debug!(paragraphs = paragraphs.len(), evidence = evidence.len(), "Synthesizing answer");

        let mut first = paragraphs
            .first()
            .copied()
            .unwrap_or(DEFAULT_FIRST_PARAGRAPH)
            .to_string();
        if sentence_count(&first) < MIN_FIRST_SENTENCES {
            first.push_str(FIRST_PARAGRAPH_SUPPLEMENT);
        }

        let second = self.second_paragraph(evidence);
        SynthesizedAnswer::new(first, second).map_err(SynthesisError::Shape)
    }

    /// Headline sentence plus one bullet per distinct reference
    pub fn second_paragraph(&self, evidence: &[EvidenceItem]) -> String {
        let valid: Vec<&EvidenceItem> = evidence.iter().filter(|e| e.is_valid()).collect();
        let Some(head) = valid.first() else {
            return GENERIC_SECOND_PARAGRAPH.to_string();
        };

        let mut seen = HashSet::new();
        let laws: Vec<String> = valid
            .iter()
            .map(|e| canonicalize(&e.legal_reference))
            .filter(|r| !r.is_empty() && seen.insert(r.key().to_string()))
            .map(|r| r.into_string())
            .collect();
        if laws.is_empty() {
            return GENERIC_SECOND_PARAGRAPH.to_string();
        }

        let headline = format!(
            "{} **‘{}’**에 해당할 수 있으며, 관련 법률로는 **‘{}’**가 있습니다.",
            HEADLINE_MARKER,
            single_line(&head.category),
            laws.join("’, ‘")
        );
        let bullets: Vec<String> = laws
            .iter()
            .map(|law| format!("- **{}**: {}", law, self.lexicon.brief_for(law)))
            .collect();

        format!("{}\n{}", headline, bullets.join("\n"))
    }
}

/// Non-blank sentences ending in `.` or `。`, plus any trailing fragment
pub fn sentence_count(paragraph: &str) -> usize {
    SENTENCE_END
        .split(paragraph)
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
