//! End-to-end tests for consultation and call analysis

use callguard_domain::answer::FALLBACK_ANSWER;
use callguard_domain::traits::{Embedder, RetrievalMatch, RetrievalService};
use callguard_domain::{AnswerPayload, ConsultRequest, EvidenceItem, TranscriptLine};
use callguard_evidence::format_evidence_text;
use callguard_gatekeeper::headline;
use callguard_lexicon::{tables, Lexicon};
use callguard_llm::MockProvider;
use callguard_pipeline::{
    session_key, Pipeline, PipelineConfig, PipelineError, StreamEvent, PLAIN_CALL_ANSWER,
};
use callguard_store::{LocalIndex, MockEmbeddingModel, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

const DIM: usize = 32;

/// Retrieval stub returning fixed matches, or failing
struct FixedRetrieval {
    matches: Vec<RetrievalMatch>,
    fail: bool,
}

impl FixedRetrieval {
    fn empty() -> Self {
        Self::with(Vec::new())
    }

    fn with(matches: Vec<RetrievalMatch>) -> Self {
        Self {
            matches,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            matches: Vec::new(),
            fail: true,
        }
    }
}

impl RetrievalService for FixedRetrieval {
    type Error = StoreError;

    fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>, Self::Error> {
        if self.fail {
            return Err(StoreError::InvalidInput("index unreachable".to_string()));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

fn guideline(category: &str, reference: &str) -> RetrievalMatch {
    let metadata: HashMap<String, String> = [
        ("유형", category),
        ("관련 법률", reference),
        ("본문", "상담 중단 후 보고"),
        ("요약", "녹취 보존"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    RetrievalMatch {
        metadata,
        score: 0.9,
    }
}

fn pipeline<R>(provider: MockProvider, retrieval: R) -> Pipeline<MockProvider, MockEmbeddingModel, R>
where
    R: RetrievalService + Send + Sync + 'static,
    R::Error: std::fmt::Display,
{
    Pipeline::new(
        provider,
        MockEmbeddingModel::new(DIM),
        retrieval,
        Arc::new(Lexicon::builtin()),
        PipelineConfig::default(),
    )
    .unwrap()
}

async fn drain(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn deltas(events: &[StreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Delta(d) => Some(d.as_str()),
            StreamEvent::Final(_) => None,
        })
        .collect()
}

fn final_payload(events: &[StreamEvent]) -> &AnswerPayload {
    assert_eq!(events.iter().filter(|e| e.is_final()).count(), 1);
    match events.last() {
        Some(StreamEvent::Final(payload)) => payload,
        other => panic!("stream must end with a final event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_consult_streams_and_fuses_evidence() {
    let reply = r#"{"answer": "녹취를 보존하세요. 팀장에게 보고하세요.\n\n무시되는 문단", "sourcePages": [{"유형": "협박/폭행(폭언) 가능성", "관련법률": "형법 제283조(협박)"}]}"#;
    let cut = reply.find("\"sourcePages\"").unwrap();
    let (head, tail) = reply.split_at(cut);
    let provider = MockProvider::with_deltas([head, tail]);
    let pipeline = pipeline(provider.clone(), FixedRetrieval::empty());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(
            ConsultRequest::new("s1", "고객이 협박하고 욕설을 했어요. 어떻게 대응하죠?"),
            tx,
        )
        .await;
    let events = drain(rx).await;

    assert_eq!(deltas(&events), reply);
    assert_eq!(final_payload(&events), &payload);

    assert_eq!(
        payload.evidence,
        vec![
            EvidenceItem::new(tables::THREAT, "형법 제283조"),
            EvidenceItem::new(tables::THREAT, "형법 제260조"),
        ]
    );
    assert_eq!(payload.evidence_text, format_evidence_text(&payload.evidence));
    assert!(payload.answer.starts_with("녹취를 보존하세요."));
    assert!(payload.answer.contains(&headline(tables::THREAT)));
    assert!(payload.answer.contains("- **형법 제283조**:"));
    assert!(payload.answer.contains("- **형법 제260조**:"));
    assert!(!payload.answer.contains("무시되는 문단"));
    assert_eq!(payload.answer.split("\n\n").count(), 2);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].system.ends_with(&format!("허용유형: {}", tables::THREAT)));
    assert!(prompts[0].user.contains("[질문]\n고객이 협박하고 욕설을 했어요."));

    let log = pipeline.sessions().get(&session_key("s1")).unwrap();
    assert_eq!(log.lock().await.len(), 1);
}

#[tokio::test]
async fn test_consult_stream_failure_sends_fallback() {
    let provider = MockProvider::with_deltas(["{\"answer\": ", "\"...\"}"]).failing_after(1);
    let pipeline = pipeline(provider, FixedRetrieval::empty());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "고객이 협박했어요"), tx)
        .await;
    let events = drain(rx).await;

    assert_eq!(payload, AnswerPayload::fallback());
    assert_eq!(payload.answer, FALLBACK_ANSWER);
    assert!(payload.evidence.is_empty());
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::Delta("{\"answer\": ".to_string()));
    assert_eq!(final_payload(&events), &payload);

    // a failed request leaves no memory behind
    let log = pipeline.sessions().get(&session_key("s1")).unwrap();
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn test_consult_retrieval_failure_sends_fallback() {
    let provider = MockProvider::new("{}");
    let pipeline = pipeline(provider.clone(), FixedRetrieval::failing());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "고객이 폭언을 했어요"), tx)
        .await;
    let events = drain(rx).await;

    assert_eq!(payload, AnswerPayload::fallback());
    assert_eq!(events, vec![StreamEvent::Final(AnswerPayload::fallback())]);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_smalltalk_short_circuit() {
    let provider = MockProvider::default();
    let pipeline = pipeline(provider.clone(), FixedRetrieval::failing());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "안녕하세요"), tx)
        .await;
    let events = drain(rx).await;

    assert_eq!(payload.answer, "안녕하세요! 만나서 반가워요 😊 무엇을 도와드릴까요?");
    assert!(payload.evidence.is_empty());
    assert_eq!(events.len(), 1);
    assert_eq!(provider.call_count(), 0);
    assert!(pipeline.sessions().is_empty());
}

#[tokio::test]
async fn test_caller_words_short_circuit() {
    let provider = MockProvider::default();
    let pipeline = pipeline(provider.clone(), FixedRetrieval::failing());

    let request = ConsultRequest::new("s1", "고객이 뭐라고 했어요?").with_transcript(vec![
        TranscriptLine::inbound("당장 환불해"),
        TranscriptLine::outbound("확인하겠습니다"),
        TranscriptLine::inbound("빨리 하라고"),
    ]);
    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline.consult(request, tx).await;
    drain(rx).await;

    assert_eq!(
        payload.answer,
        "고객 발화 내용은 다음과 같습니다:\n- 당장 환불해\n- 빨리 하라고"
    );
    assert!(payload.evidence.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_memory_carried_into_next_prompt() {
    let provider = MockProvider::new(r#"{"answer": "녹취를 보존하세요.", "sourcePages": []}"#);
    let pipeline = pipeline(provider.clone(), FixedRetrieval::empty());

    for question in ["고객이 폭언을 해요", "다시 폭언을 하면요?"] {
        let (tx, rx) = mpsc::channel(64);
        pipeline.consult(ConsultRequest::new("s1", question), tx).await;
        drain(rx).await;
    }

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].user.contains("[대화 메모리]\n(이전 대화 없음)"));
    assert!(prompts[1].user.contains("[대화 메모리]\nQ: 고객이 폭언을 해요\nA: 녹취를 보존하세요."));

    assert!(pipeline.close_session("s1"));
    assert!(!pipeline.close_session("s1"));
}

#[tokio::test]
async fn test_same_session_requests_are_serialized() {
    let provider = MockProvider::new(r#"{"answer": "녹취를 보존하세요.", "sourcePages": []}"#);
    let pipeline = pipeline(provider.clone(), FixedRetrieval::empty());

    let (tx1, rx1) = mpsc::channel(64);
    let (tx2, rx2) = mpsc::channel(64);
    let (a, b, _, _) = tokio::join!(
        pipeline.consult(ConsultRequest::new("shared", "고객이 욕설을 해요"), tx1),
        pipeline.consult(ConsultRequest::new("shared", "고객이 협박을 해요"), tx2),
        drain(rx1),
        drain(rx2),
    );
    assert_ne!(a.answer, FALLBACK_ANSWER);
    assert_ne!(b.answer, FALLBACK_ANSWER);

    let log = pipeline.sessions().get(&session_key("shared")).unwrap();
    assert_eq!(log.lock().await.len(), 2);

    // the second prompt was built after the first answer was recorded
    let prompts = provider.prompts();
    assert!(prompts[0].user.contains("(이전 대화 없음)"));
    assert!(prompts[1].user.contains("Q: 고객이"));
}

#[tokio::test]
async fn test_disallowed_model_evidence_is_filtered() {
    let reply = r#"{"answer": "고객의 성희롱 표현도 있었습니다. 녹취를 보존하세요.", "sourcePages": [{"유형": "성희롱/음란발언", "관련법률": "성폭력범죄의 처벌 등에 관한 특례법 제13조"}]}"#;
    let pipeline = pipeline(MockProvider::new(reply), FixedRetrieval::empty());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "고객이 협박했어요"), tx)
        .await;
    drain(rx).await;

    assert!(payload
        .evidence
        .iter()
        .all(|e| e.category == tables::THREAT));
    assert!(!payload.answer.contains("특례법"));
    assert!(!payload.answer.contains("성희롱"));
    assert!(payload.answer.contains("폭언 표현도 있었습니다."));
}

#[tokio::test]
async fn test_retrieval_context_respects_allowed_categories() {
    let retrieval = FixedRetrieval::with(vec![
        guideline(tables::COERCION, "형법 제324조"),
        guideline(tables::STALKING, "스토킹범죄의 처벌 등에 관한 법률 제18조"),
    ]);
    let provider = MockProvider::new("적용 조항: 형법 제324조.");
    let pipeline = pipeline(provider.clone(), retrieval);

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "고객이 사과문을 강요해요"), tx)
        .await;
    drain(rx).await;

    assert_eq!(
        payload.evidence,
        vec![EvidenceItem::new(tables::COERCION, "형법 제324조")]
    );
    let user = &provider.prompts()[0].user;
    assert!(user.contains("📌 **유형**: 강요"));
    assert!(!user.contains("📌 **유형**: 스토킹"));
    assert!(user.contains("📚 강요 관련 법률"));
}

#[tokio::test]
async fn test_consult_with_local_index() {
    let embedder = MockEmbeddingModel::new(DIM);
    let index = LocalIndex::new(DIM);
    let metadata: HashMap<String, String> = [
        ("유형", tables::INSULT),
        ("관련 법률", "형법 제311조"),
        ("요약", "모욕 발언은 녹취 후 보고"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    index
        .add(metadata, &embedder.embed("모욕 대응 지침").unwrap())
        .unwrap();

    let provider = MockProvider::new(r#"{"answer": "녹취를 보존하세요.", "sourcePages": []}"#);
    let pipeline = pipeline(provider.clone(), index);

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .consult(ConsultRequest::new("s1", "고객이 모욕적인 말을 했어요"), tx)
        .await;
    drain(rx).await;

    assert!(provider.prompts()[0].user.contains("⚖ **관련 법률**: 형법 제311조"));
    assert_eq!(
        payload.evidence,
        vec![
            EvidenceItem::new(tables::INSULT, "형법 제307조"),
            EvidenceItem::new(tables::INSULT, "형법 제311조"),
        ]
    );
}

#[tokio::test]
async fn test_analyze_empty_transcript_rejected() {
    let provider = MockProvider::default();
    let pipeline = pipeline(provider.clone(), FixedRetrieval::empty());

    let (tx, mut rx) = mpsc::channel(64);
    let result = pipeline
        .analyze(&[TranscriptLine::inbound("  ")], tx)
        .await;

    assert!(matches!(result, Err(PipelineError::EmptyTranscript)));
    assert!(rx.recv().await.is_none());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_plain_call() {
    let provider = MockProvider::new("일반 문의로 보입니다.");
    let pipeline = pipeline(provider, FixedRetrieval::empty());

    let transcript = vec![
        TranscriptLine::inbound("배송이 언제 오나요?"),
        TranscriptLine::outbound("확인해 드리겠습니다."),
    ];
    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline.analyze(&transcript, tx).await.unwrap();
    let events = drain(rx).await;

    assert_eq!(payload.answer, PLAIN_CALL_ANSWER);
    assert!(payload.evidence.is_empty());
    assert_eq!(final_payload(&events), &payload);
}

#[tokio::test]
async fn test_analyze_abusive_call() {
    let provider = MockProvider::new(r#"{"answer": "즉시 통화를 종료하고 보고하세요.", "sourcePages": []}"#);
    let pipeline = pipeline(provider.clone(), FixedRetrieval::empty());

    let transcript = vec![
        TranscriptLine::inbound("죽여버린다 이 개새끼야"),
        TranscriptLine::outbound("고객님 진정하세요"),
    ];
    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline.analyze(&transcript, tx).await.unwrap();
    drain(rx).await;

    assert_eq!(
        payload.evidence,
        vec![
            EvidenceItem::new(tables::THREAT, "형법 제283조"),
            EvidenceItem::new(tables::INSULT, "형법 제311조"),
            EvidenceItem::new(tables::INSULT, "형법 제307조"),
        ]
    );
    assert!(payload.answer.starts_with("즉시 통화를 종료하고 보고하세요."));
    assert!(payload.answer.contains(&headline(tables::THREAT)));

    let prompt = &provider.prompts()[0];
    assert!(prompt.system.is_empty());
    assert!(prompt.user.contains("INBOUND: 죽여버린다 이 개새끼야"));
    assert!(prompt.user.contains("📚 협박 관련 법률"));
    assert!(prompt.user.contains("📚 폭언 관련 법률"));
}

#[tokio::test]
async fn test_analyze_stream_failure_sends_fallback() {
    let provider = MockProvider::with_deltas(["부분"]).failing_after(1);
    let pipeline = pipeline(provider, FixedRetrieval::empty());

    let (tx, rx) = mpsc::channel(64);
    let payload = pipeline
        .analyze(&[TranscriptLine::inbound("죽여버린다")], tx)
        .await
        .unwrap();
    let events = drain(rx).await;

    assert_eq!(payload, AnswerPayload::fallback());
    assert_eq!(events.len(), 2);
    assert_eq!(final_payload(&events), &payload);
}

#[test]
fn test_invalid_config_rejected() {
    let result = Pipeline::new(
        MockProvider::default(),
        MockEmbeddingModel::new(DIM),
        FixedRetrieval::empty(),
        Arc::new(Lexicon::builtin()),
        PipelineConfig {
            top_k: 0,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(PipelineError::Config(_))));
}
