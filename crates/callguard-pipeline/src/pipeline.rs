//! Request orchestrator and its upstream helpers

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::events::StreamEvent;
use callguard_domain::traits::{CompletionService, Embedder, Prompt, RetrievalService};
use callguard_domain::AllowedCategorySet;
use callguard_evidence::{adapt_matches, RetrievalContext};
use callguard_gatekeeper::Sanitizer;
use callguard_lexicon::Lexicon;
use callguard_store::SessionStore;
use callguard_synthesizer::Synthesizer;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Answers operator questions and analyses call transcripts
///
/// Collaborators are shared behind `Arc`s; their blocking clients run on the
/// blocking thread pool.
pub struct Pipeline<C, E, R> {
    pub(crate) completion: Arc<C>,
    pub(crate) embedder: Arc<E>,
    pub(crate) retrieval: Arc<R>,
    pub(crate) lexicon: Arc<Lexicon>,
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) synthesizer: Synthesizer,
    pub(crate) sanitizer: Sanitizer,
    pub(crate) config: PipelineConfig,
}

impl<C, E, R> Pipeline<C, E, R>
where
    C: CompletionService + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    R: RetrievalService + Send + Sync + 'static,
    C::Error: Display,
    E::Error: Display,
    R::Error: Display,
{
    /// Create a pipeline with its own session store
    pub fn new(
        completion: C,
        embedder: E,
        retrieval: R,
        lexicon: Arc<Lexicon>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let sessions = Arc::new(SessionStore::new(config.max_turns));
        Self::with_sessions(completion, embedder, retrieval, lexicon, sessions, config)
    }

    /// Create a pipeline sharing an existing session store
    pub fn with_sessions(
        completion: C,
        embedder: E,
        retrieval: R,
        lexicon: Arc<Lexicon>,
        sessions: Arc<SessionStore>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            completion: Arc::new(completion),
            embedder: Arc::new(embedder),
            retrieval: Arc::new(retrieval),
            synthesizer: Synthesizer::new(Arc::clone(&lexicon)),
            sanitizer: Sanitizer::new(Arc::clone(&lexicon)),
            lexicon,
            sessions,
            config,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shared lexicon
    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Session memory store
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Dispose of a consultation session's memory
    pub fn close_session(&self, session_id: &str) -> bool {
        self.sessions.close(&session_key(session_id))
    }

    /// Embed `text`, query the index and adapt matches outside `allowed` away
    pub(crate) async fn retrieve(
        &self,
        text: String,
        allowed: AllowedCategorySet,
    ) -> Result<RetrievalContext, PipelineError> {
        if text.trim().is_empty() {
            return Ok(RetrievalContext::empty());
        }
        let embedder = Arc::clone(&self.embedder);
        let retrieval = Arc::clone(&self.retrieval);
        let top_k = self.config.top_k;

        let matches = tokio::task::spawn_blocking(move || {
            let vector = embedder
                .embed(&text)
                .map_err(|e| format!("Embedding failed: {}", e))?;
            retrieval
                .query(&vector, top_k)
                .map_err(|e| format!("Retrieval failed: {}", e))
        })
        .await
        .map_err(|e| PipelineError::Upstream(e.to_string()))?
        .map_err(PipelineError::Upstream)?;

        let context = adapt_matches(&matches, &allowed);
        debug!(
            matches = matches.len(),
            items = context.batch.len(),
            "Retrieved guidelines"
        );
        Ok(context)
    }

    /// Stream a completion, forwarding each delta to `events`
    ///
    /// A closed receiver does not stop generation; the full text is still
    /// returned.
    pub(crate) async fn stream(
        &self,
        prompt: Prompt,
        events: &mpsc::Sender<StreamEvent>,
    ) -> Result<String, PipelineError> {
        let completion = Arc::clone(&self.completion);
        let tx = events.clone();

        tokio::task::spawn_blocking(move || {
            completion
                .stream_completion(&prompt, &mut |delta| {
                    if !delta.is_empty() {
                        let _ = tx.blocking_send(StreamEvent::Delta(delta.to_string()));
                    }
                })
                .map_err(|e| format!("Completion failed: {}", e))
        })
        .await
        .map_err(|e| PipelineError::Upstream(e.to_string()))?
        .map_err(PipelineError::Upstream)
    }
}

/// Session store key for a consultation session id
pub fn session_key(session_id: &str) -> String {
    format!("call:{}", session_id)
}
