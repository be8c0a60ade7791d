//! Hash-based embedding model
//!
//! Deterministic, unit-length vectors derived from text hashes. Lets the
//! retrieval path run end to end without an embedding service.
//!
//! ```rust
//! use callguard_store::MockEmbeddingModel;
//! use callguard_domain::traits::Embedder;
//!
//! let model = MockEmbeddingModel::new(64);
//! let a = model.embed("폭언 대응").unwrap();
//! assert_eq!(a.len(), 64);
//! assert_eq!(a, model.embed("폭언 대응").unwrap());
//! ```

use crate::error::StoreError;
use callguard_domain::traits::Embedder;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic embedding model for tests and development
#[derive(Debug, Clone, Copy)]
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Model producing vectors of `dimension`
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Output dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let normalized = (hasher.finish() as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }
}

impl Embedder for MockEmbeddingModel {
    type Error = StoreError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }
        Ok(embedding)
    }
}
