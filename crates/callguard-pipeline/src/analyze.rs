//! Whole-call analysis: a finished transcript, no operator question

use crate::error::PipelineError;
use crate::events::StreamEvent;
use crate::pipeline::Pipeline;
use crate::prompt::{analysis_prompt, is_blank_transcript, transcript_text};
use callguard_domain::traits::{CompletionService, Embedder, RetrievalService};
use callguard_domain::{AllowedCategorySet, AnswerPayload, EvidenceBatch, EvidenceItem, RequestId, TranscriptLine};
use callguard_evidence::{
    format_evidence_text, fuse, interpret_model_output, law_mention_batch, CONTEXT_SEPARATOR,
};
use callguard_lexicon::detect_abuse_types;
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Answer for a call in which no source found anything actionable
pub const PLAIN_CALL_ANSWER: &str = "안녕하세요 상담원님, 방금 통화 중에 발생한 상황에 대해 처리 방법과 관련 법률을 안내해드리겠습니다.\n\n\
현재 통화 내용에서는 특별히 문제가 되는 발언이 발견되지 않았습니다. 따라서 본 건은 법적 조치 대상은 아니며 일반 민원 응대로 판단됩니다.\n\n\
➕ 추가로 도움이 필요하시면 언제든 말씀해주세요!";

const UNATTRIBUTED_CATEGORY: &str = "관련법률";

impl<C, E, R> Pipeline<C, E, R>
where
    C: CompletionService + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    R: RetrievalService + Send + Sync + 'static,
    C::Error: Display,
    E::Error: Display,
    R::Error: Display,
{
    /// Analyse a whole call transcript
    ///
    /// An empty transcript is rejected before anything is sent. Otherwise
    /// the stream always ends with a final event: the synthesized answer, the
    /// plain-call answer when no evidence source found anything, or the
    /// fallback payload after an upstream failure.
    pub async fn analyze(
        &self,
        transcript: &[TranscriptLine],
        events: mpsc::Sender<StreamEvent>,
    ) -> Result<AnswerPayload, PipelineError> {
        if is_blank_transcript(transcript) {
            return Err(PipelineError::EmptyTranscript);
        }
        let request_id = RequestId::new();
        info!(request = %request_id, lines = transcript.len(), "Analysis started");

        let payload = match self.try_analyze(request_id, transcript, &events).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(request = %request_id, error = %e, "Analysis failed, sending fallback");
                AnswerPayload::fallback()
            }
        };

        if events.send(StreamEvent::Final(payload.clone())).await.is_err() {
            debug!(request = %request_id, "Receiver dropped before final event");
        }
        Ok(payload)
    }

    async fn try_analyze(
        &self,
        request_id: RequestId,
        transcript: &[TranscriptLine],
        events: &mpsc::Sender<StreamEvent>,
    ) -> Result<AnswerPayload, PipelineError> {
        let dialogue = transcript_text(transcript, self.config.transcript_line_cap);
        let retrieved = self
            .retrieve(dialogue.clone(), AllowedCategorySet::new())
            .await?;

        let abuse_types = detect_abuse_types(&dialogue);
        let mut references = retrieved.context_text.clone();
        for kind in &abuse_types {
            if !references.is_empty() {
                references.push_str(CONTEXT_SEPARATOR);
            }
            references.push_str(kind.prompt_note());
        }

        let full = self
            .stream(analysis_prompt(&dialogue, &references), events)
            .await?;

        let mut lexicon_items = self.lexicon.keyword_hints(&dialogue, self.config.hint_limit);
        lexicon_items.extend(
            abuse_types
                .iter()
                .map(|kind| EvidenceItem::new(kind.category(), kind.reference())),
        );

        let category = abuse_types
            .first()
            .map(|kind| kind.category().to_string())
            .or_else(|| lexicon_items.first().map(|h| h.category.clone()))
            .unwrap_or_else(|| UNATTRIBUTED_CATEGORY.to_string());
        let reply = interpret_model_output(&full, &category, self.config.law_mention_limit);
        let model_batch = if reply.batch.is_empty() {
            law_mention_batch(&full, &category, self.config.law_mention_limit)
        } else {
            reply.batch
        };

        if lexicon_items.is_empty() && retrieved.batch.is_empty() && model_batch.is_empty() {
            info!(request = %request_id, "No evidence found, plain call");
            return Ok(AnswerPayload::text_only(PLAIN_CALL_ANSWER));
        }

        let evidence = fuse(
            vec![EvidenceBatch::lexicon(lexicon_items), retrieved.batch, model_batch],
            self.config.evidence_limit,
        );
        let synthesized = self.synthesizer.synthesize(&reply.answer, &evidence)?;
        let answer = self.sanitizer.sanitize(
            &synthesized.render(),
            &evidence,
            &AllowedCategorySet::new(),
        );

        info!(
            request = %request_id,
            abuse_types = abuse_types.len(),
            evidence = evidence.len(),
            "Analysis answered"
        );
        let evidence_text = format_evidence_text(&evidence);
        Ok(AnswerPayload::new(answer, evidence, evidence_text))
    }
}
