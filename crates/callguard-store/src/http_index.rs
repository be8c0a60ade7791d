//! Hosted vector index client (Pinecone-compatible `POST /query`)

use crate::error::StoreError;
use crate::vector_index::metadata_string;
use callguard_domain::traits::{RetrievalMatch, RetrievalService};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for index queries
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

/// Blocking client for a hosted index
pub struct HttpIndex {
    host: String,
    api_key: Option<String>,
    namespace: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpIndex {
    /// Client for the index served at `host`
    pub fn new(host: impl Into<String>, api_key: Option<String>) -> Result<Self, StoreError> {
        Self::with_timeout(host, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Client with a custom timeout
    pub fn with_timeout(
        host: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            api_key,
            namespace: None,
            client,
        })
    }

    /// Query within a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl RetrievalService for HttpIndex {
    type Error = StoreError;

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>, Self::Error> {
        let url = format!("{}/query", self.host);
        let mut request = self.client.post(&url).json(&QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        });
        if let Some(key) = &self.api_key {
            request = request.header("Api-Key", key);
        }

        let response = request
            .send()
            .map_err(|e| StoreError::Http(format!("Request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http(format!("HTTP {}: {}", status, body)));
        }

        let body: QueryResponse = response
            .json()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        debug!(matches = body.matches.len(), "Index query answered");
        Ok(body.matches.into_iter().map(into_match).collect())
    }
}

fn into_match(m: QueryMatch) -> RetrievalMatch {
    RetrievalMatch {
        metadata: m
            .metadata
            .iter()
            .filter_map(|(k, v)| metadata_string(v).map(|s| (k.clone(), s)))
            .collect(),
        score: m.score,
    }
}
