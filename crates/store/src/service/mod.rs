//! Remote vector-index service abstraction.
//!
//! Index lifecycle, storage and nearest-neighbour search all live on the
//! other side of this trait. `VectorStore` only sequences calls to it.

pub mod memory;
pub mod pinecone;

pub use memory::MemoryIndexService;
pub use pinecone::PineconeService;

use crate::types::{IndexDescription, IndexHandle, IndexSpec, Namespace, QueryRequest, ScoredMatch, VectorRecord};
use vectorlink_core::AppResult;

/// Trait for hosted vector-index backends.
///
/// Implementations must:
/// - Report `AppError::IndexConflict` when `create_index` hits an existing name
/// - Report every other failure as `AppError::Remote`
/// - Return query matches already ranked, closest first
#[async_trait::async_trait]
pub trait IndexService: Send + Sync + std::fmt::Debug {
    /// Backend name for logs (e.g., "pinecone", "memory")
    fn service_name(&self) -> &str;

    /// List every index visible to the caller.
    async fn list_indexes(&self) -> AppResult<Vec<IndexDescription>>;

    /// Create an index.
    async fn create_index(&self, spec: &IndexSpec) -> AppResult<()>;

    /// Look up one index by name.
    async fn describe_index(&self, name: &str) -> AppResult<IndexDescription>;

    /// Insert or overwrite records by id in one call. Returns the upserted count.
    async fn upsert(
        &self,
        index: &IndexHandle,
        records: &[VectorRecord],
        namespace: &Namespace,
    ) -> AppResult<usize>;

    /// Nearest-neighbour query.
    async fn query(&self, index: &IndexHandle, request: &QueryRequest)
        -> AppResult<Vec<ScoredMatch>>;
}
