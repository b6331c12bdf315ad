//! Embedding providers.
//!
//! Text is turned into vectors by an `EmbeddingProvider`; the store never
//! computes embeddings itself.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
