//! Vector store integration layer.
//!
//! Ensures a hosted vector index exists, turns text into embeddings,
//! upserts vectors with metadata and queries by similarity. Search and
//! embedding both happen in remote services reached through the
//! `IndexService` and `EmbeddingProvider` traits.
//!
//! # Example
//! ```no_run
//! use vectorlink_core::AppConfig;
//! use vectorlink_store::{Namespace, VectorStore, DEFAULT_TOP_K};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let store = VectorStore::from_config(&config)?;
//! let namespace = Namespace::default();
//!
//! store
//!     .store_texts(&["Rust has no garbage collector".to_string()], &namespace)
//!     .await?;
//! let hits = store.query_text("memory management", DEFAULT_TOP_K, &namespace).await?;
//! for hit in hits {
//!     println!("{} {:.3} {}", hit.id, hit.score, hit.text().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embeddings;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use service::{IndexService, MemoryIndexService, PineconeService};
pub use store::{VectorStore, DEFAULT_BATCH_SIZE, DEFAULT_TOP_K};
pub use types::{
    IndexDescription, IndexHandle, IndexMetric, IndexSpec, Metadata, Namespace, QueryRequest,
    QueryResult, ScoredMatch, VectorRecord, TEXT_KEY,
};
