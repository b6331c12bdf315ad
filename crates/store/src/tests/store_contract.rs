//! Tests for the store contract against the in-memory index service.

use crate::embeddings::providers::MockProvider;
use crate::service::MemoryIndexService;
use crate::store::{VectorStore, DEFAULT_TOP_K};
use crate::types::{IndexMetric, IndexSpec, Metadata, Namespace, VectorRecord};
use std::collections::HashSet;
use std::sync::Arc;
use vectorlink_core::AppError;

#[cfg(test)]
mod tests {
    use super::*;

    const DIMENSION: usize = 64;

    /// Helper to build a store over a fresh in-memory service.
    fn setup() -> (Arc<MemoryIndexService>, VectorStore) {
        let service = Arc::new(MemoryIndexService::new());
        let spec = IndexSpec {
            name: "contract".to_string(),
            dimension: DIMENSION,
            metric: IndexMetric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        };
        let store = VectorStore::new(
            service.clone(),
            Arc::new(MockProvider::new(DIMENSION)),
            spec,
        );
        (service, store)
    }

    /// Helper to create a unit vector pointing mostly along one axis.
    fn axis(i: usize, lean: f32) -> Vec<f32> {
        let mut v = vec![0.0; DIMENSION];
        v[i % DIMENSION] = 1.0;
        v[(i + 1) % DIMENSION] = lean;
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    #[tokio::test]
    async fn test_repeated_setup_creates_once() {
        let (service, store) = setup();

        store.ensure_index_ready().await.unwrap();
        store.ensure_index_ready().await.unwrap();

        assert_eq!(service.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_setup_tolerates_concurrent_creation() {
        let (service, store) = setup();
        store.ensure_index_ready().await.unwrap();

        // Listing misses the index, so creation runs and reports a conflict
        service.set_stale_listing(true);
        let handle = store.ensure_index_ready().await.unwrap();

        assert_eq!(service.create_calls(), 2);
        assert_eq!(handle.name, "contract");
        assert!(store.is_ready());
    }

    #[tokio::test]
    async fn test_operations_before_setup_fail() {
        let (_service, store) = setup();
        let ns = Namespace::default();

        let err = store
            .upsert_vectors(&[VectorRecord::new("v1", axis(0, 0.0)).with_text("x")], &ns)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotInitialized));

        let err = store
            .query_similar(&axis(0, 0.0), DEFAULT_TOP_K, &ns)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotInitialized));
    }

    #[tokio::test]
    async fn test_query_results_come_from_upserted_set() {
        let (_service, store) = setup();
        store.ensure_index_ready().await.unwrap();
        let ns = Namespace::from("docs");

        let records: Vec<VectorRecord> = (0..4)
            .map(|i| VectorRecord::new(format!("v{}", i), axis(i * 3, 0.2)).with_text(format!("text {}", i)))
            .collect();
        let upserted = store.upsert_vectors(&records, &ns).await.unwrap();
        assert_eq!(upserted, 4);

        let results = store.query_similar(&axis(0, 0.0), 10, &ns).await.unwrap();

        let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert!(results.len() <= records.len());
        assert!(results.iter().all(|r| known.contains(r.id.as_str())));
        assert_eq!(results[0].id, "v0");
    }

    #[tokio::test]
    async fn test_matches_without_text_are_dropped() {
        let (_service, store) = setup();
        store.ensure_index_ready().await.unwrap();
        let ns = Namespace::default();

        let records = vec![
            VectorRecord::new("empty", axis(0, 0.0)).with_metadata(Metadata::new()),
            VectorRecord::new("bare", axis(0, 0.1)),
            VectorRecord::new("texted", axis(0, 0.2)).with_text("x"),
        ];
        store.upsert_vectors(&records, &ns).await.unwrap();

        let results = store.query_similar(&axis(0, 0.0), 3, &ns).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "texted");
        assert_eq!(results[0].text(), Some("x"));
    }

    #[tokio::test]
    async fn test_top_k_limits_and_orders_results() {
        let (_service, store) = setup();
        store.ensure_index_ready().await.unwrap();
        let ns = Namespace::default();

        let records = vec![
            VectorRecord::new("near", axis(0, 0.1)).with_text("near"),
            VectorRecord::new("mid", axis(0, 1.0)).with_text("mid"),
            VectorRecord::new("far", axis(1, 0.0)).with_text("far"),
        ];
        store.upsert_vectors(&records, &ns).await.unwrap();

        let results = store.query_similar(&axis(0, 0.0), 2, &ns).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "near");
        assert_eq!(results[1].id, "mid");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_stored_text_is_found_by_its_own_embedding() {
        let (_service, store) = setup();
        let ns = Namespace::default();

        store
            .store_texts(&["a".to_string(), "b".to_string()], &ns)
            .await
            .unwrap();

        let query = store.embedder().embed("a").await.unwrap();
        let results = store.query_similar(&query, DEFAULT_TOP_K, &ns).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text(), Some("a"));
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_text_matches_stored_chunk() {
        let (_service, store) = setup();
        let ns = Namespace::from("notes");

        let chunks = vec![
            "rust ownership and borrowing".to_string(),
            "baking sourdough bread".to_string(),
            "gardening in spring".to_string(),
        ];
        store.store_texts(&chunks, &ns).await.unwrap();

        let results = store.query_text("rust borrowing", 1, &ns).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), Some("rust ownership and borrowing"));
    }

    #[tokio::test]
    async fn test_namespaces_do_not_leak() {
        let (_service, store) = setup();
        store
            .store_texts(&["only here".to_string()], &Namespace::from("left"))
            .await
            .unwrap();

        let query = store.embedder().embed("only here").await.unwrap();
        let results = store
            .query_similar(&query, DEFAULT_TOP_K, &Namespace::from("right"))
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces_remote_error() {
        let (_service, store) = setup();
        store.ensure_index_ready().await.unwrap();

        let err = store
            .upsert_vectors(
                &[VectorRecord::new("short", vec![1.0, 0.0]).with_text("x")],
                &Namespace::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Remote { status: Some(400), .. }));
    }
}
