//! Parsing of the generative model's JSON reply

use crate::error::EvidenceError;
use callguard_domain::{EvidenceBatch, EvidenceItem};
use callguard_lexicon::extract_law_mentions;
use serde_json::{Map, Value};
use tracing::debug;

const ANSWER_KEYS: &[&str] = &["answer", "답변"];
const EVIDENCE_KEYS: &[&str] = &["sourcePages", "evidence"];
const CATEGORY_KEYS: &[&str] = &["유형", "category"];
const REFERENCE_KEYS: &[&str] = &["관련법률", "관련 법률", "legalReference"];

/// The model's reply split into prose and asserted evidence
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    /// Answer prose handed to the synthesizer
    pub answer: String,

    /// Model-asserted evidence
    pub batch: EvidenceBatch,
}

/// Parse `{answer, sourcePages}` out of the raw model text
///
/// Markdown code fences are stripped, and prose around the outermost braces
/// is ignored. Anything that is not a JSON object is an
/// [`EvidenceError::Parse`].
pub fn parse_model_output(raw: &str) -> Result<ModelReply, EvidenceError> {
    let json = extract_json(raw);
    let value: Value =
        serde_json::from_str(json).map_err(|e| EvidenceError::Parse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| EvidenceError::Parse("Model output is not a JSON object".to_string()))?;

    let answer = ANSWER_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string();

    let items = EVIDENCE_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_array))
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .filter_map(parse_item)
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelReply {
        answer,
        batch: EvidenceBatch::model(items),
    })
}

/// Parse the reply, falling back to prose with law mentions as evidence
///
/// When the output is not a JSON object the whole text is the answer and
/// evidence is re-derived from law mentions in it, attributed to
/// `fallback_category`.
pub fn interpret_model_output(raw: &str, fallback_category: &str, limit: usize) -> ModelReply {
    match parse_model_output(raw) {
        Ok(reply) => reply,
        Err(e) => {
            debug!(error = %e, "Model output treated as prose");
            ModelReply {
                answer: raw.trim().to_string(),
                batch: law_mention_batch(raw, fallback_category, limit),
            }
        }
    }
}

/// Model-origin batch built from the law mentions in `text`
pub fn law_mention_batch(text: &str, category: &str, limit: usize) -> EvidenceBatch {
    EvidenceBatch::model(
        extract_law_mentions(text, limit)
            .into_iter()
            .map(|law| EvidenceItem::new(category, law))
            .collect(),
    )
}

fn parse_item(obj: &Map<String, Value>) -> Option<EvidenceItem> {
    let category = CATEGORY_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))?;
    let reference = REFERENCE_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))?;
    Some(EvidenceItem::new(category, reference))
}

/// Extract JSON from a response that may be wrapped in a code fence
fn extract_json(response: &str) -> &str {
    let mut trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the fence line (```json or ```)
        trimmed = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        trimmed = trimmed.trim_end().trim_end_matches("```").trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callguard_domain::EvidenceOrigin;

    #[test]
    fn test_parse_plain_json() {
        let reply = parse_model_output(
            r#"{"answer": "통화를 종료하세요.", "sourcePages": [{"유형": "협박", "관련법률": "형법 제283조(협박)"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.answer, "통화를 종료하세요.");
        assert_eq!(reply.batch.origin(), EvidenceOrigin::ModelAsserted);
        assert_eq!(reply.batch.items(), &[EvidenceItem::new("협박", "형법 제283조(협박)")]);
    }

    #[test]
    fn test_parse_fenced_json_with_alternate_keys() {
        let raw = "```json\n{\"answer\": \"a\", \"evidence\": [{\"category\": \"강요\", \"legalReference\": \"형법 제324조\"}, {\"category\": \"x\"}, 3]}\n```";
        let reply = parse_model_output(raw).unwrap();
        assert_eq!(reply.batch.items(), &[EvidenceItem::new("강요", "형법 제324조")]);
    }

    #[test]
    fn test_parse_json_surrounded_by_prose() {
        let reply = parse_model_output("결과입니다: {\"answer\": \"b\"} 이상입니다").unwrap();
        assert_eq!(reply.answer, "b");
        assert!(reply.batch.is_empty());
    }

    #[test]
    fn test_non_object_is_parse_error() {
        assert!(matches!(parse_model_output("[1, 2]"), Err(EvidenceError::Parse(_))));
        assert!(matches!(parse_model_output("그냥 문장입니다."), Err(EvidenceError::Parse(_))));
        assert!(matches!(parse_model_output(""), Err(EvidenceError::Parse(_))));
    }

    #[test]
    fn test_interpret_recovers_law_mentions() {
        let raw = "해당 조항: 형법 제283조, 형법 제311조.";
        let reply = interpret_model_output(raw, "협박", 3);
        assert_eq!(reply.answer, raw);
        let refs: Vec<&str> = reply
            .batch
            .items()
            .iter()
            .map(|i| i.legal_reference.as_str())
            .collect();
        assert_eq!(refs, vec!["형법 제283조", "형법 제311조"]);
        assert!(reply.batch.items().iter().all(|i| i.category == "협박"));
    }
}
