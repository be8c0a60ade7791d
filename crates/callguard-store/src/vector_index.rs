//! In-process HNSW retrieval index
//!
//! Holds legal-guideline documents (metadata + embedding) and answers
//! nearest-neighbour queries through the `RetrievalService` trait. Used in
//! development and tests in place of the hosted index.
//!
//! # HNSW Parameters
//!
//! - **M**: bi-directional links per node (16)
//! - **efConstruction**: candidate list size while building (200)
//! - **efSearch**: candidate list size while querying (64)

use crate::error::StoreError;
use callguard_domain::traits::{Embedder, RetrievalMatch, RetrievalService};
use hnsw_rs::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_EF_SEARCH: usize = 64;
const DEFAULT_MAX_ELEMENTS: usize = 100_000;

/// One entry of a documents file
///
/// ```json
/// [{"id": "doc-1", "text": "…", "metadata": {"유형": "…", "관련 법률": "…", "요약": "…"}}]
/// ```
#[derive(Debug, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    id: String,
    text: String,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

/// HNSW index over document embeddings with per-document metadata
pub struct LocalIndex {
    dimension: usize,
    hnsw: Mutex<Hnsw<'static, f32, DistCosine>>,
    documents: Mutex<Vec<HashMap<String, String>>>,
}

impl LocalIndex {
    /// Empty index for vectors of `dimension`
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            hnsw: Mutex::new(new_hnsw()),
            documents: Mutex::new(Vec::new()),
        }
    }

    /// Build an index from a documents JSON file, embedding each text
    ///
    /// The text is stored under `본문`; metadata arrays are joined with `, `.
    pub fn load_documents<E>(path: impl AsRef<Path>, embedder: &E) -> Result<Self, StoreError>
    where
        E: Embedder,
        E::Error: Display,
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records: Vec<DocumentRecord> =
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.display().to_string(),
                source,
            })?;

        let mut index: Option<LocalIndex> = None;
        for record in &records {
            let vector = embedder
                .embed(&record.text)
                .map_err(|e| StoreError::Embedding(format!("{}: {}", record.id, e)))?;
            let target = index.get_or_insert_with(|| LocalIndex::new(vector.len()));

            let mut metadata: HashMap<String, String> = record
                .metadata
                .iter()
                .filter_map(|(k, v)| metadata_string(v).map(|s| (k.clone(), s)))
                .collect();
            metadata.insert("본문".to_string(), record.text.clone());
            if !record.id.is_empty() {
                metadata.insert("id".to_string(), record.id.clone());
            }
            target.add(metadata, &vector)?;
        }

        let index = index.ok_or_else(|| {
            StoreError::InvalidInput(format!("{} holds no documents", path.display()))
        })?;
        info!(documents = index.len(), dimension = index.dimension, "Loaded local index");
        Ok(index)
    }

    /// Add one document; returns its internal id
    pub fn add(&self, metadata: HashMap<String, String>, embedding: &[f32]) -> Result<usize, StoreError> {
        if embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let internal_id = documents.len();
        documents.push(metadata);
        drop(documents);

        let embedding_vec = embedding.to_vec();
        let hnsw = self.hnsw.lock().unwrap_or_else(|e| e.into_inner());
        hnsw.insert((&embedding_vec, internal_id));

        Ok(internal_id)
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// True when the index holds no document
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RetrievalService for LocalIndex {
    type Error = StoreError;

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>, Self::Error> {
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let hnsw = self.hnsw.lock().unwrap_or_else(|e| e.into_inner());
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let mut matches: Vec<RetrievalMatch> = hnsw
            .search(vector, top_k, DEFAULT_EF_SEARCH.max(top_k))
            .into_iter()
            .filter_map(|neighbour| {
                documents.get(neighbour.d_id).map(|metadata| RetrievalMatch {
                    metadata: metadata.clone(),
                    // cosine distance → similarity
                    score: 1.0 - neighbour.distance,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(matches)
    }
}

fn new_hnsw() -> Hnsw<'static, f32, DistCosine> {
    let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
    Hnsw::<'static, f32, DistCosine>::new(
        DEFAULT_M,
        DEFAULT_MAX_ELEMENTS,
        nb_layer,
        DEFAULT_EF_CONSTRUCTION,
        DistCosine {},
    )
}

/// String form of a metadata value; arrays of scalars are comma-joined
pub(crate) fn metadata_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(metadata_string).collect();
            Some(parts.join(", "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockEmbeddingModel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn meta(category: &str) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("유형".to_string(), category.to_string());
        m
    }

    #[test]
    fn test_query_orders_by_similarity() {
        let index = LocalIndex::new(3);
        index.add(meta("x"), &[1.0, 0.0, 0.0]).unwrap();
        index.add(meta("y"), &[0.0, 1.0, 0.0]).unwrap();
        index.add(meta("xy"), &[0.7071, 0.7071, 0.0]).unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].probe(&["유형"]), Some("x"));
        assert!(results[0].score > 0.99);
        assert_eq!(results[1].probe(&["유형"]), Some("xy"));
        assert_eq!(results[2].probe(&["유형"]), Some("y"));
        assert!(results[2].score < 0.1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = LocalIndex::new(4);
        assert!(matches!(
            index.add(meta("x"), &[0.1; 3]),
            Err(StoreError::DimensionMismatch { expected: 4, actual: 3 })
        ));
        assert!(index.query(&[0.1; 5], 1).is_err());
        assert!(index.query(&[0.1; 4], 0).unwrap().is_empty());
    }

    #[test]
    fn test_load_documents() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "d1", "text": "고객이 죽여버린다고 협박함",
                  "metadata": {{"유형": "협박/폭행(폭언) 가능성", "관련 법률": "형법 제283조",
                               "주요 키워드": ["협박", "죽여"], "요약": "협박 사례"}}}},
                {{"id": "d2", "text": "반복적인 장난전화",
                  "metadata": {{"유형": "장난전화/경범", "관련 법률": "경범죄처벌법 제3조 제1항 제40호"}}}}
            ]"#
        )
        .unwrap();

        let model = MockEmbeddingModel::new(32);
        let index = LocalIndex::load_documents(file.path(), &model).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 32);

        let query = model.embed("고객이 죽여버린다고 협박함").unwrap();
        let results = index.query(&query, 1).unwrap();
        assert_eq!(results[0].probe(&["관련 법률"]), Some("형법 제283조"));
        assert_eq!(results[0].probe(&["주요 키워드"]), Some("협박, 죽여"));
        assert_eq!(results[0].probe(&["본문"]), Some("고객이 죽여버린다고 협박함"));
    }

    #[test]
    fn test_load_documents_errors() {
        let model = MockEmbeddingModel::new(8);
        let mut empty = NamedTempFile::new().unwrap();
        write!(empty, "[]").unwrap();
        assert!(matches!(
            LocalIndex::load_documents(empty.path(), &model),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            LocalIndex::load_documents("/nonexistent/documents.json", &model),
            Err(StoreError::Io { .. })
        ));
    }
}
