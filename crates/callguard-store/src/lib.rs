//! CallGuard Storage Layer
//!
//! Session memory and retrieval backends.
//!
//! # Architecture
//!
//! - `SessionStore`: per-session bounded memory, one async lock per key
//! - `LocalIndex`: in-process HNSW index over legal-guideline documents
//! - `HttpIndex`: hosted index client (Pinecone-compatible query API)
//! - `MockEmbeddingModel`: hash-based embeddings for tests
//!
//! # Examples
//!
//! ```
//! use callguard_store::SessionStore;
//!
//! let store = SessionStore::new(8);
//! let _handle = store.open("call:42");
//! assert_eq!(store.len(), 1);
//! assert!(store.close("call:42"));
//! ```

#![warn(missing_docs)]

pub mod embedding;
mod error;
pub mod http_index;
pub mod session;
pub mod vector_index;

pub use embedding::MockEmbeddingModel;
pub use error::StoreError;
pub use http_index::HttpIndex;
pub use session::{SessionHandle, SessionLog, SessionStore, Turn, DEFAULT_MAX_TURNS};
pub use vector_index::LocalIndex;
