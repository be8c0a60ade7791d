//! Regex families over free text: abuse types and law mentions

use crate::tables;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Abuse type recognized by the transcript regex families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AbuseType {
    /// Threats of violence
    Threat,
    /// Sexual remarks
    Sexual,
    /// Profanity and insults
    Insult,
}

impl AbuseType {
    /// Category name the type maps to
    pub fn category(&self) -> &'static str {
        match self {
            AbuseType::Threat => tables::THREAT,
            AbuseType::Sexual => tables::SEXUAL_HARASSMENT,
            AbuseType::Insult => tables::INSULT,
        }
    }

    /// Legal reference string for the type (may hold several, `;`-joined)
    pub fn reference(&self) -> &'static str {
        match self {
            AbuseType::Threat => "형법 제283조",
            AbuseType::Sexual => "성폭력범죄의 처벌 등에 관한 특례법 제13조",
            AbuseType::Insult => "형법 제311조; 형법 제307조",
        }
    }

    /// Reference note added to analysis prompts
    pub fn prompt_note(&self) -> &'static str {
        match self {
            AbuseType::Threat => "📚 협박 관련 법률:\n- 형법 제283조(협박): 3년 이하 징역 또는 500만원 이하 벌금",
            AbuseType::Sexual => "📚 성희롱 관련 법률:\n- 성폭력범죄의 처벌 등에 관한 특례법 제13조(통신매체를 이용한 음란행위): 2년 이하 징역 또는 2천만원 이하 벌금",
            AbuseType::Insult => "📚 폭언 관련 법률:\n- 형법 제311조(모욕): 1년 이하 징역 또는 200만원 이하 벌금\n- 형법 제307조(명예훼손): 2년 이하 징역 또는 500만원 이하 벌금",
        }
    }
}

static THREAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"죽(여|인다|여버리|여버린다)",
        r"가만(두지|안[둘둔다])",
        r"찾아가(서)? (가만두지|혼내|죽이)",
        r"찌[른를]다",
        r"폭탄",
        r"테러",
        r"협박(한다)?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEXUAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"야하",
        r"섹시",
        r"외모.*(평가|품평)",
        r"밤에.*(피는|만나)",
        r"(음란|음탕|음흉)",
        r"(신음|야동|가슴|엉덩이|음부|유두)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static INSULT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"시발", r"씨발", r"개새끼", r"미친", r"병신", r"등신", r"x발", r"꺼져", r"애미|애비",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LAW_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[가-힣A-Za-z·\s]{1,25}?법(?:률)?\s*제\s*\d+\s*조(?:\s*제\s*\d+\s*항)?(?:\s*\([^)]+\))?")
        .unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static LEGAL_REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"제\s*\d+\s*조|(지침|규정|법률)\s*$").unwrap());

/// Abuse types whose patterns occur in `text`, in enum order
pub fn detect_abuse_types(text: &str) -> Vec<AbuseType> {
    let hay = text.to_lowercase();
    let families: [(AbuseType, &Lazy<Vec<Regex>>); 3] = [
        (AbuseType::Threat, &THREAT_PATTERNS),
        (AbuseType::Sexual, &SEXUAL_PATTERNS),
        (AbuseType::Insult, &INSULT_PATTERNS),
    ];
    families
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(&hay)))
        .map(|(kind, _)| *kind)
        .collect()
}

/// "…법 제N조(제M항)" mentions in free prose
///
/// Whitespace is collapsed; duplicates (case-insensitive) are skipped; at most
/// `limit` mentions are returned in order of appearance.
pub fn extract_law_mentions(text: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for hit in LAW_MENTION_RE.find_iter(text) {
        if out.len() >= limit {
            break;
        }
        let mention = WHITESPACE_RE.replace_all(hit.as_str(), " ").trim().to_string();
        if mention.is_empty() || !seen.insert(mention.to_lowercase()) {
            continue;
        }
        out.push(mention);
    }
    out
}

/// Heuristic: does this bold bullet label name a statute or guideline?
pub fn looks_like_legal_reference(text: &str) -> bool {
    LEGAL_REFERENCE_RE.is_match(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_abuse_types() {
        assert_eq!(
            detect_abuse_types("INBOUND: 찾아가서 죽여버린다\nINBOUND: 목소리가 야하네"),
            vec![AbuseType::Threat, AbuseType::Sexual]
        );
        assert_eq!(detect_abuse_types("X발 꺼져"), vec![AbuseType::Insult]);
        assert!(detect_abuse_types("요금 문의드립니다").is_empty());
    }

    #[test]
    fn test_abuse_type_mapping() {
        assert_eq!(AbuseType::Threat.category(), tables::THREAT);
        assert!(AbuseType::Insult.reference().contains("형법 제311조"));
        assert!(AbuseType::Sexual.prompt_note().contains("특례법 제13조"));
    }

    #[test]
    fn test_extract_law_mentions() {
        let text = "적용 법률: 형법 제283조(협박), 형법  제311조, 형법 제283조(협박).\n\
                    성폭력범죄의 처벌 등에 관한 특례법 제13조 제1항 적용.";
        let mentions = extract_law_mentions(text, 5);
        assert_eq!(mentions[0], "형법 제283조(협박)");
        assert_eq!(mentions[1], "형법 제311조");
        assert!(mentions[2].ends_with("특례법 제13조 제1항"));
        assert_eq!(mentions.len(), 3);
    }

    #[test]
    fn test_extract_law_mentions_limit() {
        let text = "형법 제1조, 형법 제2조, 형법 제3조";
        assert_eq!(extract_law_mentions(text, 2).len(), 2);
        assert!(extract_law_mentions("법률 조항 없음", 5).is_empty());
    }

    #[test]
    fn test_looks_like_legal_reference() {
        assert!(looks_like_legal_reference("형법 제283조"));
        assert!(looks_like_legal_reference("국민권익위원회 상담사 보호 지침"));
        assert!(looks_like_legal_reference("민원처리법 제23조"));
        assert!(!looks_like_legal_reference("대응 방법"));
        assert!(!looks_like_legal_reference("민원 대처법"));
        assert!(!looks_like_legal_reference("1차 조치"));
    }
}
