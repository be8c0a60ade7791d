//! Operator consultation: one question in the context of a live call

use crate::error::PipelineError;
use crate::events::StreamEvent;
use crate::pipeline::{session_key, Pipeline};
use crate::prompt::{transcript_text, ConsultPromptBuilder};
use callguard_domain::traits::{CompletionService, Embedder, RetrievalService};
use callguard_domain::{AnswerPayload, ConsultRequest, EvidenceBatch, RequestId, Speaker};
use callguard_evidence::{filter_by_allowed, format_evidence_text, fuse, interpret_model_output};
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Reply prefix when the operator asks what the caller said
pub const CALLER_WORDS_HEADER: &str = "고객 발화 내용은 다음과 같습니다:";

/// Reply when the transcript holds no caller line
pub const NO_CALLER_WORDS: &str = "기록된 고객 발화가 없습니다.";

/// Category attributed to law mentions when no keyword hint names one
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
    /// Answer one operator question
    ///
    /// Deltas are sent while the model generates; the returned payload is
    /// also sent as the final event. Any upstream failure yields the static
    /// fallback payload and leaves session memory untouched.
    pub async fn consult(
        &self,
        request: ConsultRequest,
        events: mpsc::Sender<StreamEvent>,
    ) -> AnswerPayload {
        let request_id = RequestId::new();
        info!(
            request = %request_id,
            session = %request.session_id,
            "Consultation started"
        );

        let payload = match self.try_consult(request_id, &request, &events).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(request = %request_id, error = %e, "Consultation failed, sending fallback");
                AnswerPayload::fallback()
            }
        };

        if events.send(StreamEvent::Final(payload.clone())).await.is_err() {
            debug!(request = %request_id, "Receiver dropped before final event");
        }
        payload
    }

    async fn try_consult(
        &self,
        request_id: RequestId,
        request: &ConsultRequest,
        events: &mpsc::Sender<StreamEvent>,
    ) -> Result<AnswerPayload, PipelineError> {
        let question = request.question.trim();
        let lines = request.transcript_lines();

        if self.lexicon.is_smalltalk(question) {
            debug!(request = %request_id, "Smalltalk short-circuit");
            return Ok(AnswerPayload::text_only(self.lexicon.smalltalk_reply(question)));
        }
        if self.lexicon.is_asking_caller_words(question) {
            debug!(request = %request_id, "Caller-words short-circuit");
            return Ok(AnswerPayload::text_only(caller_words(request)));
        }

        let transcript = transcript_text(lines, self.config.transcript_line_cap);
        let from_question = self.lexicon.detect_categories(question);
        let allowed = if from_question.is_empty() {
            self.lexicon.detect_categories(&transcript)
        } else {
            from_question.clone()
        };

        let haystack = format!("{}\n{}", transcript, question).trim().to_string();
        let hint_hay = if from_question.is_empty() {
            haystack.as_str()
        } else {
            question
        };

        let retrieved = self.retrieve(haystack.clone(), allowed.clone()).await?;
        let additional_laws = self.lexicon.additional_laws_text(hint_hay);

        let session = self.sessions.open(&session_key(&request.session_id));
        let mut log = session.lock().await;

        let prompt = ConsultPromptBuilder::new(question)
            .with_transcript(transcript)
            .with_memory(log.render())
            .with_retrieval(retrieved.context_text.clone())
            .with_additional_laws(additional_laws)
            .with_allowed(allowed.clone())
            .build();

        let full = self.stream(prompt, events).await?;

        let hints = self.lexicon.keyword_hints(hint_hay, self.config.hint_limit);
        let fallback_category = hints
            .first()
            .map(|h| h.category.clone())
            .unwrap_or_else(|| UNATTRIBUTED_CATEGORY.to_string());
        let reply = interpret_model_output(&full, &fallback_category, self.config.law_mention_limit);

        let fused = fuse(
            vec![EvidenceBatch::lexicon(hints), retrieved.batch, reply.batch],
            self.config.evidence_limit,
        );
        let evidence = filter_by_allowed(fused, &allowed);

        let synthesized = self.synthesizer.synthesize(&reply.answer, &evidence)?;
        let answer = self
            .sanitizer
            .sanitize(&synthesized.render(), &evidence, &allowed);

        log.push(question, answer.clone());
        info!(
            request = %request_id,
            session = %request.session_id,
            evidence = evidence.len(),
            turns = log.len(),
            "Consultation answered"
        );

        let evidence_text = format_evidence_text(&evidence);
        Ok(AnswerPayload::new(answer, evidence, evidence_text))
    }
}

fn caller_words(request: &ConsultRequest) -> String {
    let said: Vec<&str> = request
        .transcript_lines()
        .iter()
        .filter(|l| l.speaker == Speaker::Inbound)
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if said.is_empty() {
        return NO_CALLER_WORDS.to_string();
    }
    format!("{}\n- {}", CALLER_WORDS_HEADER, said.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use callguard_domain::TranscriptLine;

    #[test]
    fn test_caller_words_lists_inbound_only() {
        let request = ConsultRequest::new("s1", "고객이 뭐라고 했나요?").with_transcript(vec![
            TranscriptLine::inbound("환불해 달라고요"),
            TranscriptLine::outbound("확인해 드리겠습니다"),
            TranscriptLine::inbound("  "),
            TranscriptLine::inbound("빨리요"),
        ]);
        assert_eq!(
            caller_words(&request),
            "고객 발화 내용은 다음과 같습니다:\n- 환불해 달라고요\n- 빨리요"
        );
    }

    #[test]
    fn test_caller_words_without_transcript() {
        let request = ConsultRequest::new("s1", "무슨 말을 했죠?");
        assert_eq!(caller_words(&request), NO_CALLER_WORDS);
    }
}
