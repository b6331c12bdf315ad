//! In-process index service with the same contract as the hosted one.
//!
//! Keeps records in memory, scores by the index metric with a linear scan,
//! and reports errors the way the remote service does (409 on duplicate
//! create, 400 on dimension mismatch, 404 on unknown index). Intended for
//! tests and local experiments only.

use crate::service::IndexService;
use crate::types::{
    IndexDescription, IndexHandle, IndexMetric, IndexSpec, Namespace, QueryRequest, ScoredMatch,
    VectorRecord,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use vectorlink_core::{AppError, AppResult};

#[derive(Debug)]
struct MemoryIndex {
    description: IndexDescription,
    namespaces: HashMap<Namespace, HashMap<String, VectorRecord>>,
}

/// In-memory `IndexService`.
#[derive(Debug, Default)]
pub struct MemoryIndexService {
    indexes: RwLock<HashMap<String, MemoryIndex>>,
    create_calls: AtomicUsize,
    /// When set, `list_indexes` reports nothing (as if another caller created concurrently)
    stale_listing: AtomicBool,
    /// When set, the next `create_index` fails with this HTTP status
    create_failure: Mutex<Option<u16>>,
}

impl MemoryIndexService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create_index` calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Make `list_indexes` return an empty list, hiding existing indexes.
    pub fn set_stale_listing(&self, stale: bool) {
        self.stale_listing.store(stale, Ordering::SeqCst);
    }

    /// Fail the next `create_index` call with the given HTTP status.
    pub fn fail_next_create(&self, status: u16) -> AppResult<()> {
        let mut failure = self.create_failure.lock().map_err(|_| poisoned())?;
        *failure = Some(status);
        Ok(())
    }

    /// Number of records stored in one namespace of an index.
    pub fn record_count(&self, index: &str, namespace: &Namespace) -> AppResult<usize> {
        let indexes = self.indexes.read().map_err(|_| poisoned())?;
        Ok(indexes
            .get(index)
            .and_then(|idx| idx.namespaces.get(namespace))
            .map(|records| records.len())
            .unwrap_or(0))
    }
}

fn poisoned() -> AppError {
    AppError::Other("In-memory index lock poisoned".to_string())
}

fn not_found(name: &str) -> AppError {
    AppError::remote(404, format!("Index '{}' not found", name))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn score(metric: IndexMetric, query: &[f32], values: &[f32]) -> f32 {
    match metric {
        IndexMetric::Dotproduct => dot(query, values),
        IndexMetric::Euclidean => query
            .iter()
            .zip(values)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>(),
        IndexMetric::Cosine => {
            let norms = dot(query, query).sqrt() * dot(values, values).sqrt();
            if norms == 0.0 {
                0.0
            } else {
                dot(query, values) / norms
            }
        }
    }
}

#[async_trait]
impl IndexService for MemoryIndexService {
    fn service_name(&self) -> &str {
        "memory"
    }

    async fn list_indexes(&self) -> AppResult<Vec<IndexDescription>> {
        if self.stale_listing.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let indexes = self.indexes.read().map_err(|_| poisoned())?;
        let mut descriptions: Vec<IndexDescription> = indexes
            .values()
            .map(|idx| idx.description.clone())
            .collect();
        descriptions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptions)
    }

    async fn create_index(&self, spec: &IndexSpec) -> AppResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.create_failure.lock().map_err(|_| poisoned())?.take() {
            return Err(AppError::remote(status, "Injected create failure"));
        }

        if spec.dimension == 0 {
            return Err(AppError::remote(400, "Dimension must be positive"));
        }

        let mut indexes = self.indexes.write().map_err(|_| poisoned())?;
        if indexes.contains_key(&spec.name) {
            return Err(AppError::IndexConflict(spec.name.clone()));
        }

        indexes.insert(
            spec.name.clone(),
            MemoryIndex {
                description: IndexDescription {
                    name: spec.name.clone(),
                    dimension: spec.dimension,
                    metric: spec.metric,
                    host: format!("memory://{}", spec.name),
                    ready: true,
                },
                namespaces: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> AppResult<IndexDescription> {
        let indexes = self.indexes.read().map_err(|_| poisoned())?;
        indexes
            .get(name)
            .map(|idx| idx.description.clone())
            .ok_or_else(|| not_found(name))
    }

    async fn upsert(
        &self,
        index: &IndexHandle,
        records: &[VectorRecord],
        namespace: &Namespace,
    ) -> AppResult<usize> {
        let mut indexes = self.indexes.write().map_err(|_| poisoned())?;
        let idx = indexes
            .get_mut(&index.name)
            .ok_or_else(|| not_found(&index.name))?;

        let dimension = idx.description.dimension;
        if let Some(bad) = records.iter().find(|r| r.values.len() != dimension) {
            return Err(AppError::remote(
                400,
                format!(
                    "Vector dimension {} does not match the dimension of the index {} (id '{}')",
                    bad.values.len(),
                    dimension,
                    bad.id
                ),
            ));
        }

        let stored = idx.namespaces.entry(namespace.clone()).or_default();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        index: &IndexHandle,
        request: &QueryRequest,
    ) -> AppResult<Vec<ScoredMatch>> {
        if request.top_k == 0 {
            return Err(AppError::remote(400, "topK must be greater than 0"));
        }

        let indexes = self.indexes.read().map_err(|_| poisoned())?;
        let idx = indexes
            .get(&index.name)
            .ok_or_else(|| not_found(&index.name))?;

        let metric = idx.description.metric;
        if request.vector.len() != idx.description.dimension {
            return Err(AppError::remote(
                400,
                format!(
                    "Query vector dimension {} does not match the dimension of the index {}",
                    request.vector.len(),
                    idx.description.dimension
                ),
            ));
        }

        let Some(records) = idx.namespaces.get(&request.namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<ScoredMatch> = records
            .values()
            .map(|r| ScoredMatch {
                id: r.id.clone(),
                score: score(metric, &request.vector, &r.values),
                metadata: if request.include_metadata {
                    r.metadata.clone()
                } else {
                    None
                },
            })
            .collect();

        matches.sort_by(|a, b| {
            let order = if metric.higher_is_closer() {
                b.score.total_cmp(&a.score)
            } else {
                a.score.total_cmp(&b.score)
            };
            order.then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(request.top_k);

        Ok(matches)
    }
}
