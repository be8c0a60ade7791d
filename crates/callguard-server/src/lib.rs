//! CallGuard Server
//!
//! HTTP front end for call-center operators: streamed consultation answers,
//! whole-call analysis, session disposal and the per-utterance abuse filter.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod retriever;

pub use error::ServerError;

use callguard_filter::{AbuseFilter, HttpClassifier};
use callguard_lexicon::Lexicon;
use callguard_llm::OllamaProvider;
use callguard_pipeline::Pipeline;
use config::ServerConfig;
use handlers::{create_router, AppState};
use retriever::Retriever;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Application state wired to the production collaborators
pub type ServiceState = AppState<OllamaProvider, OllamaProvider, Retriever, HttpClassifier>;

/// Build every collaborator named by `config`
///
/// Blocking: constructs blocking HTTP clients and may embed the local
/// documents file, so call it outside the async runtime.
pub fn build_state(config: &ServerConfig) -> Result<ServiceState, ServerError> {
    config.validate()?;

    let lexicon = match (&config.lexicon.badwords, &config.lexicon.force_block) {
        (Some(badwords), Some(force_block)) => {
            info!(badwords = %badwords.display(), "Loading word lists");
            Lexicon::from_files(badwords, force_block)
                .map_err(|e| ServerError::Startup(e.to_string()))?
        }
        _ => Lexicon::builtin(),
    };
    let lexicon = Arc::new(lexicon);

    let provider = OllamaProvider::with_timeout(
        config.llm.endpoint.clone(),
        config.llm.chat_model.clone(),
        config.llm.embed_model.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .map_err(|e| ServerError::Startup(e.to_string()))?
    .with_max_retries(config.llm.max_retries)
    .with_temperature(config.llm.temperature);
    info!(
        endpoint = %config.llm.endpoint,
        chat_model = %config.llm.chat_model,
        embed_model = %config.llm.embed_model,
        "Model server configured"
    );

    let retriever = Retriever::from_config(&config.retrieval, &provider)?;

    let classifier = HttpClassifier::with_timeout(
        config.classifier.endpoint.clone(),
        Duration::from_secs(config.classifier.timeout_secs),
    )
    .map_err(|e| ServerError::Startup(e.to_string()))?;

    let pipeline = Pipeline::new(
        provider.clone(),
        provider,
        retriever,
        Arc::clone(&lexicon),
        config.pipeline.clone(),
    )
    .map_err(|e| ServerError::Startup(e.to_string()))?;

    Ok(AppState {
        pipeline: Arc::new(pipeline),
        filter: Arc::new(AbuseFilter::new(classifier, lexicon)),
    })
}

/// Bind the configured address and serve until the listener fails
pub async fn serve(config: &ServerConfig, state: ServiceState) -> Result<(), ServerError> {
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("CallGuard listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
