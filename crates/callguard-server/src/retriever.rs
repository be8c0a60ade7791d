//! Retrieval backend selected by `[retrieval]`

use crate::config::{RetrievalBackend, RetrievalSection};
use crate::error::ServerError;
use callguard_domain::traits::{Embedder, RetrievalMatch, RetrievalService};
use callguard_store::{HttpIndex, LocalIndex, StoreError};
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};

/// Guideline index behind the pipeline
pub enum Retriever {
    /// In-process index
    Local(LocalIndex),
    /// Hosted index over HTTP
    Hosted(HttpIndex),
}

impl Retriever {
    /// Build the configured backend
    ///
    /// The local backend embeds every document with `embedder`, so this
    /// blocks until the documents file is indexed. Without a documents file
    /// the local index stays empty and every query answers nothing.
    pub fn from_config<E>(section: &RetrievalSection, embedder: &E) -> Result<Self, ServerError>
    where
        E: Embedder,
        E::Error: Display,
    {
        match section.backend {
            RetrievalBackend::Local => match &section.documents {
                Some(path) => {
                    let index = LocalIndex::load_documents(path, embedder)
                        .map_err(|e| ServerError::Startup(e.to_string()))?;
                    Ok(Retriever::Local(index))
                }
                None => {
                    warn!("No retrieval.documents configured, guideline retrieval is empty");
                    Ok(Retriever::Local(LocalIndex::new(0)))
                }
            },
            RetrievalBackend::Hosted => {
                let mut index = HttpIndex::with_timeout(
                    section.host.clone(),
                    section.api_key.clone(),
                    Duration::from_secs(section.timeout_secs),
                )
                .map_err(|e| ServerError::Startup(e.to_string()))?;
                if let Some(namespace) = &section.namespace {
                    index = index.with_namespace(namespace.clone());
                }
                info!(host = %section.host, "Using hosted retrieval index");
                Ok(Retriever::Hosted(index))
            }
        }
    }
}

impl RetrievalService for Retriever {
    type Error = StoreError;

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>, Self::Error> {
        match self {
            Retriever::Local(index) => index.query(vector, top_k),
            Retriever::Hosted(index) => index.query(vector, top_k),
        }
    }
}
