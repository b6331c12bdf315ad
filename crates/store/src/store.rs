//! The vector store session: index lifecycle, ingestion and query.
//!
//! A `VectorStore` owns the index service, the embedding provider and the
//! index handle. Callers construct one and pass it by reference; there is
//! no process-global state.
//!
//! Ingestion has two independent entry points:
//! - `store_texts`: set up the index, embed raw text, upsert in batches
//! - `upsert_vectors`: write caller-built records in a single call
//!
//! Both take the target namespace explicitly, as does `query_similar`.

use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::service::{IndexService, PineconeService};
use crate::types::{
    IndexHandle, IndexSpec, Namespace, QueryRequest, QueryResult, VectorRecord, TEXT_KEY,
};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};
use vectorlink_core::{AppConfig, AppError, AppResult};

/// Neighbours returned by a query when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 2;

/// Texts embedded and upserted per round-trip by `store_texts`.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Session object over one remote index.
#[derive(Debug)]
pub struct VectorStore {
    service: Arc<dyn IndexService>,
    embedder: Arc<dyn EmbeddingProvider>,
    spec: IndexSpec,
    batch_size: usize,
    handle: RwLock<Option<IndexHandle>>,
}

impl VectorStore {
    /// Create a store over explicit collaborators. No remote call is made.
    pub fn new(
        service: Arc<dyn IndexService>,
        embedder: Arc<dyn EmbeddingProvider>,
        spec: IndexSpec,
    ) -> Self {
        Self {
            service,
            embedder,
            spec,
            batch_size: DEFAULT_BATCH_SIZE,
            handle: RwLock::new(None),
        }
    }

    /// Set how many texts `store_texts` sends per round-trip (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Build a store talking to Pinecone and the configured embedding provider.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let service = Arc::new(PineconeService::from_settings(&config.pinecone)?);
        let embedder = create_provider(&config.embedding)?;
        let spec = IndexSpec::from_settings(&config.pinecone)?;

        Ok(Self::new(service, embedder, spec).with_batch_size(config.embedding.batch_size))
    }

    /// Name of the index this store manages.
    pub fn index_name(&self) -> &str {
        &self.spec.name
    }

    /// The embedding provider used by `store_texts` and `query_text`.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// The index handle, once `ensure_index_ready` has run.
    pub fn handle(&self) -> AppResult<IndexHandle> {
        let guard = self.handle.read().map_err(|_| poisoned())?;
        guard.clone().ok_or(AppError::NotInitialized)
    }

    /// Whether `ensure_index_ready` has completed at least once.
    pub fn is_ready(&self) -> bool {
        self.handle().is_ok()
    }

    /// Make sure the configured index exists, creating it if needed, and
    /// remember its handle.
    ///
    /// Safe to call repeatedly. When creation reports that the index already
    /// exists (another caller won the race), that outcome is accepted; any
    /// other failure is returned unchanged.
    #[instrument(skip_all, fields(index = %self.spec.name, service = self.service.service_name()))]
    pub async fn ensure_index_ready(&self) -> AppResult<IndexHandle> {
        let existing = self.service.list_indexes().await?;

        if existing.iter().any(|idx| idx.name == self.spec.name) {
            debug!("Index '{}' already exists", self.spec.name);
        } else {
            info!(
                "Creating index '{}' (dimension {}, metric {}, {}/{})",
                self.spec.name,
                self.spec.dimension,
                self.spec.metric.as_str(),
                self.spec.cloud,
                self.spec.region
            );
            match self.service.create_index(&self.spec).await {
                Ok(()) => {}
                Err(e) if e.is_conflict() => {
                    debug!("Index '{}' was created concurrently", self.spec.name);
                }
                Err(e) => return Err(e),
            }
        }

        let description = self.service.describe_index(&self.spec.name).await?;
        if !description.ready {
            debug!("Index '{}' reports not ready yet", description.name);
        }

        let handle = IndexHandle::from(description);
        let mut guard = self.handle.write().map_err(|_| poisoned())?;
        *guard = Some(handle.clone());

        Ok(handle)
    }

    /// Embed `chunks` and store them in `namespace`.
    ///
    /// Sets up the index first on every call. Each chunk becomes a record
    /// with a fresh UUID and metadata `{"text": chunk}`. Records are written
    /// in batches; the first failing batch fails the whole call.
    #[instrument(skip_all, fields(index = %self.spec.name, count = chunks.len(), namespace = %namespace))]
    pub async fn store_texts(&self, chunks: &[String], namespace: &Namespace) -> AppResult<()> {
        let handle = self.ensure_index_ready().await?;

        for batch in chunks.chunks(self.batch_size) {
            let embeddings = self.embedder.embed_batch(batch).await?;
            if embeddings.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Provider '{}' returned {} embeddings for {} texts",
                    self.embedder.provider_name(),
                    embeddings.len(),
                    batch.len()
                )));
            }

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(text, values)| {
                    VectorRecord::new(uuid::Uuid::new_v4().to_string(), values)
                        .with_text(text.as_str())
                })
                .collect();

            self.service.upsert(&handle, &records, namespace).await?;
            debug!("Upserted batch of {} records", records.len());
        }

        info!(
            "Stored {} texts in index '{}' (namespace '{}')",
            chunks.len(),
            handle.name,
            namespace
        );

        Ok(())
    }

    /// Write caller-built records to `namespace` in one remote call.
    ///
    /// Requires a prior `ensure_index_ready`. Returns the upserted count
    /// reported by the service.
    #[instrument(skip_all, fields(index = %self.spec.name, count = vectors.len(), namespace = %namespace))]
    pub async fn upsert_vectors(
        &self,
        vectors: &[VectorRecord],
        namespace: &Namespace,
    ) -> AppResult<usize> {
        let handle = self.handle()?;
        self.service.upsert(&handle, vectors, namespace).await
    }

    /// Find the `top_k` nearest records to `vector` in `namespace`.
    ///
    /// Requires a prior `ensure_index_ready`. Matches without metadata or
    /// without a `text` field are dropped; the service's ranking is kept.
    #[instrument(skip_all, fields(index = %self.spec.name, top_k = top_k, namespace = %namespace))]
    pub async fn query_similar(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &Namespace,
    ) -> AppResult<Vec<QueryResult>> {
        let handle = self.handle()?;

        let request = QueryRequest::new(vector.to_vec(), top_k).with_namespace(namespace.clone());
        let matches = self.service.query(&handle, &request).await?;
        let raw = matches.len();

        let results: Vec<QueryResult> = matches
            .into_iter()
            .filter_map(QueryResult::from_match)
            .collect();

        if results.len() < raw {
            debug!(
                "Dropped {} of {} matches without '{}' metadata",
                raw - results.len(),
                raw,
                TEXT_KEY
            );
        }

        Ok(results)
    }

    /// Embed `text` with the session provider, then `query_similar`.
    pub async fn query_text(
        &self,
        text: &str,
        top_k: usize,
        namespace: &Namespace,
    ) -> AppResult<Vec<QueryResult>> {
        // Fail fast before spending an embedding call
        self.handle()?;
        let vector = self.embedder.embed(text).await?;
        self.query_similar(&vector, top_k, namespace).await
    }
}

fn poisoned() -> AppError {
    AppError::Other("Index handle lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::service::MemoryIndexService;
    use crate::types::IndexMetric;

    fn store(service: Arc<MemoryIndexService>) -> VectorStore {
        let spec = IndexSpec {
            name: "lessons".to_string(),
            dimension: 64,
            metric: IndexMetric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        };
        VectorStore::new(service, Arc::new(MockProvider::new(64)), spec)
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_index() {
        let service = Arc::new(MemoryIndexService::new());
        let store = store(service.clone());
        assert!(!store.is_ready());

        let handle = store.ensure_index_ready().await.unwrap();

        assert_eq!(handle.name, "lessons");
        assert_eq!(handle.dimension, 64);
        assert_eq!(service.create_calls(), 1);
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_ensure_propagates_other_create_failures() {
        let service = Arc::new(MemoryIndexService::new());
        service.fail_next_create(403).unwrap();
        let store = store(service);

        let err = store.ensure_index_ready().await.unwrap_err();
        assert!(matches!(err, AppError::Remote { status: Some(403), .. }));
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn test_batch_size_has_floor() {
        let store = store(Arc::new(MemoryIndexService::new())).with_batch_size(0);
        assert_eq!(store.batch_size, 1);
    }

    #[tokio::test]
    async fn test_store_texts_batches_everything() {
        let service = Arc::new(MemoryIndexService::new());
        let store = store(service.clone()).with_batch_size(2);
        let ns = Namespace::from("lessons");

        let chunks: Vec<String> = (0..5).map(|i| format!("chunk number {}", i)).collect();
        store.store_texts(&chunks, &ns).await.unwrap();

        assert_eq!(service.record_count("lessons", &ns).unwrap(), 5);
    }

    #[tokio::test]
    async fn test_store_texts_empty_input_still_sets_up() {
        let service = Arc::new(MemoryIndexService::new());
        let store = store(service.clone());

        store.store_texts(&[], &Namespace::default()).await.unwrap();

        assert!(store.is_ready());
        assert_eq!(service.record_count("lessons", &Namespace::default()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_text_requires_setup() {
        let store = store(Arc::new(MemoryIndexService::new()));
        let err = store
            .query_text("anything", DEFAULT_TOP_K, &Namespace::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotInitialized));
    }
}
