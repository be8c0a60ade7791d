//! HTTP request handlers for the consultation service.
//!
//! Consultation and analysis answers are streamed as server-sent events:
//! one `data:` event per model delta, then `[JSON]` followed by the final
//! payload, then `[END]`. The abuse filter answers with plain JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{delete, get, post},
    Router as AxumRouter,
};
use callguard_domain::traits::{ClassifierOracle, CompletionService, Embedder, RetrievalService};
use callguard_domain::{ConsultRequest, TranscriptLine};
use callguard_filter::{AbuseFilter, FilterError, FilterReport};
use callguard_pipeline::{is_blank_transcript, Pipeline, StreamEvent};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

/// Prefix of the final payload event
pub const PAYLOAD_MARKER: &str = "[JSON]";

/// Last event of every stream
pub const END_MARKER: &str = "[END]";

/// Stream body sent when an analysis request carries no transcript
pub const EMPTY_TRANSCRIPT_MESSAGE: &str = "세션에 스크립트 없음";

const NO_BUFFERING: [(&str, &str); 1] = [("x-accel-buffering", "no")];

/// Shared application state
pub struct AppState<C, E, R, K> {
    /// Consultation and analysis pipeline
    pub pipeline: Arc<Pipeline<C, E, R>>,
    /// Per-utterance abuse filter
    pub filter: Arc<AbuseFilter<K>>,
}

impl<C, E, R, K> Clone for AppState<C, E, R, K> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            filter: Arc::clone(&self.filter),
        }
    }
}

/// Whole-call analysis request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Finished call transcript
    #[serde(default)]
    pub transcript: Vec<TranscriptLine>,
}

/// Abuse filter request
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    /// One utterance
    pub text: String,
}

/// Session disposal response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClosedResponse {
    /// Session id from the path
    pub session_id: String,
    /// Whether the session held memory
    pub closed: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Open consultation sessions
    pub sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Abuse filter error
    FilterError(FilterError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::FilterError(e @ (FilterError::Upstream(_) | FilterError::Malformed(_))) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::FilterError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::FilterError(e)
    }
}

/// SSE event carrying `text`; carriage returns are not representable
fn data_event(text: &str) -> Event {
    Event::default().data(text.replace('\r', ""))
}

fn stream_event(event: StreamEvent) -> Event {
    match event {
        StreamEvent::Delta(delta) => data_event(&delta),
        StreamEvent::Final(payload) => {
            let json = serde_json::to_string(&payload).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to serialize payload");
                serde_json::json!({ "answer": payload.answer }).to_string()
            });
            data_event(&format!("{}{}", PAYLOAD_MARKER, json))
        }
    }
}

/// Channel-backed SSE body closed by the end marker
fn sse_body(
    rx: mpsc::Receiver<StreamEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = ReceiverStream::new(rx)
        .map(stream_event)
        .chain(tokio_stream::once(data_event(END_MARKER)))
        .map(Ok::<_, Infallible>);
    Sse::new(events)
}

impl<C, E, R, K> AppState<C, E, R, K>
where
    C: CompletionService + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    R: RetrievalService + Send + Sync + 'static,
    K: ClassifierOracle + Send + Sync + 'static,
    C::Error: Display,
    E::Error: Display,
    R::Error: Display,
    K::Error: Display,
{
    /// POST /chat/stream - Answer an operator question as an event stream
    async fn chat_stream(State(state): State<Self>, Json(request): Json<ConsultRequest>) -> Response {
        let (tx, rx) = mpsc::channel(state.pipeline.config().stream_buffer);
        let pipeline = Arc::clone(&state.pipeline);
        tokio::spawn(async move {
            pipeline.consult(request, tx).await;
        });
        (NO_BUFFERING, sse_body(rx)).into_response()
    }

    /// POST /chat/analyze - Analyse a finished call as an event stream
    async fn chat_analyze(
        State(state): State<Self>,
        Json(request): Json<AnalyzeRequest>,
    ) -> Response {
        if is_blank_transcript(&request.transcript) {
            debug!("Analysis requested without transcript");
            let events = tokio_stream::iter([
                data_event(EMPTY_TRANSCRIPT_MESSAGE),
                data_event(END_MARKER),
            ])
            .map(Ok::<_, Infallible>);
            return (StatusCode::BAD_REQUEST, NO_BUFFERING, Sse::new(events)).into_response();
        }

        let (tx, rx) = mpsc::channel(state.pipeline.config().stream_buffer);
        let pipeline = Arc::clone(&state.pipeline);
        tokio::spawn(async move {
            if let Err(e) = pipeline.analyze(&request.transcript, tx).await {
                warn!(error = %e, "Analysis rejected");
            }
        });
        (NO_BUFFERING, sse_body(rx)).into_response()
    }

    /// DELETE /chat/session/:id - Dispose of a session's memory
    async fn close_session(
        State(state): State<Self>,
        Path(session_id): Path<String>,
    ) -> Json<SessionClosedResponse> {
        let closed = state.pipeline.close_session(&session_id);
        Json(SessionClosedResponse { session_id, closed })
    }

    /// POST /api/abuse/filter - Classify one utterance
    async fn abuse_filter(
        State(state): State<Self>,
        Json(request): Json<FilterRequest>,
    ) -> Result<Json<FilterReport>, AppError> {
        let filter = Arc::clone(&state.filter);
        let report = tokio::task::spawn_blocking(move || filter.filter(&request.text))
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))??;
        Ok(Json(report))
    }

    /// GET /health - Health check
    async fn health_check(State(state): State<Self>) -> Json<HealthCheckResponse> {
        Json(HealthCheckResponse {
            status: "ok".to_string(),
            sessions: state.pipeline.sessions().len(),
        })
    }
}

/// Create the axum router with all routes
pub fn create_router<C, E, R, K>(state: AppState<C, E, R, K>) -> AxumRouter
where
    C: CompletionService + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    R: RetrievalService + Send + Sync + 'static,
    K: ClassifierOracle + Send + Sync + 'static,
    C::Error: Display,
    E::Error: Display,
    R::Error: Display,
    K::Error: Display,
{
    AxumRouter::new()
        .route("/chat/stream", post(AppState::<C, E, R, K>::chat_stream))
        .route("/chat/analyze", post(AppState::<C, E, R, K>::chat_analyze))
        .route("/chat/session/:id", delete(AppState::<C, E, R, K>::close_session))
        .route("/api/abuse/filter", post(AppState::<C, E, R, K>::abuse_filter))
        .route("/health", get(AppState::<C, E, R, K>::health_check))
        .with_state(state)
}
