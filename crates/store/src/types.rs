//! Vector store type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vectorlink_core::{AppError, AppResult, PineconeSettings};

/// Metadata attached to a record: string keys, scalar or text values.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key every queryable record must carry.
pub const TEXT_KEY: &str = "text";

/// A partition inside an index. Records in different namespaces never mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Similarity metric of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexMetric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl IndexMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Dotproduct => "dotproduct",
        }
    }

    /// Whether a higher score means a closer match.
    pub fn higher_is_closer(&self) -> bool {
        !matches!(self, Self::Euclidean)
    }
}

impl FromStr for IndexMetric {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "dotproduct" | "dot" => Ok(Self::Dotproduct),
            other => Err(AppError::Config(format!(
                "Unknown metric: {}. Supported: cosine, euclidean, dotproduct",
                other
            ))),
        }
    }
}

/// Everything needed to create an index remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: IndexMetric,
    /// Serverless placement
    pub cloud: String,
    pub region: String,
}

impl IndexSpec {
    /// Build the creation spec from configuration.
    pub fn from_settings(settings: &PineconeSettings) -> AppResult<Self> {
        Ok(Self {
            name: settings.index_name.clone(),
            dimension: settings.dimension,
            metric: settings.metric.parse()?,
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
        })
    }
}

/// An index as reported by the service's list/describe calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    pub metric: IndexMetric,
    /// Data-plane host; empty while the service is still provisioning
    pub host: String,
    pub ready: bool,
}

/// Reference to a remote index, held by a `VectorStore` once set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexHandle {
    pub name: String,
    pub host: String,
    pub dimension: usize,
    pub metric: IndexMetric,
}

impl From<IndexDescription> for IndexHandle {
    fn from(desc: IndexDescription) -> Self {
        Self {
            name: desc.name,
            host: desc.host,
            dimension: desc.dimension,
            metric: desc.metric,
        }
    }
}

/// A vector with its id and optional metadata, as written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique within a namespace; upserting the same id overwrites
    pub id: String,

    /// Length must equal the index dimension (enforced remotely)
    pub values: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: None,
        }
    }

    /// Replace the metadata map.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the `text` metadata field, keeping any other fields.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(TEXT_KEY.to_string(), serde_json::Value::String(text.into()));
        self
    }
}

/// A similarity query against one namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub namespace: Namespace,
    pub include_metadata: bool,
}

impl QueryRequest {
    pub fn new(vector: Vec<f32>, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            namespace: Namespace::default(),
            include_metadata: true,
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }
}

/// A raw match as returned by the index service, in service ranking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// A query hit handed back to callers. Always carries a `text` metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,

    /// Similarity; higher is closer under cosine
    pub score: f32,

    pub metadata: Metadata,
}

impl QueryResult {
    /// Project a raw match, dropping it unless it has metadata with a `text` key.
    pub fn from_match(m: ScoredMatch) -> Option<Self> {
        let metadata = m.metadata?;
        if !metadata.contains_key(TEXT_KEY) {
            return None;
        }
        Some(Self {
            id: m.id,
            score: m.score,
            metadata,
        })
    }

    /// The `text` field, when it is a string.
    pub fn text(&self) -> Option<&str> {
        self.metadata.get(TEXT_KEY).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_namespace() {
        assert_eq!(Namespace::default().as_str(), "default");
        assert_eq!(Namespace::from("lessons").to_string(), "lessons");
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("cosine".parse::<IndexMetric>().unwrap(), IndexMetric::Cosine);
        assert_eq!("DotProduct".parse::<IndexMetric>().unwrap(), IndexMetric::Dotproduct);
        assert!("manhattan".parse::<IndexMetric>().is_err());
    }

    #[test]
    fn test_index_spec_from_default_settings() {
        let settings = PineconeSettings {
            index_name: "lessons".to_string(),
            ..Default::default()
        };
        let spec = IndexSpec::from_settings(&settings).unwrap();
        assert_eq!(spec.name, "lessons");
        assert_eq!(spec.dimension, 1536);
        assert_eq!(spec.metric, IndexMetric::Cosine);
        assert_eq!(spec.cloud, "aws");
        assert_eq!(spec.region, "us-east-1");
    }

    #[test]
    fn test_with_text_keeps_other_fields() {
        let record = VectorRecord::new("r1", vec![0.1, 0.2])
            .with_metadata(metadata(json!({"source_url": "https://example.com"})))
            .with_text("hello");

        let meta = record.metadata.unwrap();
        assert_eq!(meta["text"], "hello");
        assert_eq!(meta["source_url"], "https://example.com");
    }

    #[test]
    fn test_record_without_metadata_serializes_without_field() {
        let record = VectorRecord::new("r1", vec![1.0]);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_query_result_requires_text() {
        let with_text = ScoredMatch {
            id: "a".to_string(),
            score: 0.9,
            metadata: Some(metadata(json!({"text": "x"}))),
        };
        let empty_meta = ScoredMatch {
            id: "b".to_string(),
            score: 0.8,
            metadata: Some(Metadata::new()),
        };
        let no_meta = ScoredMatch {
            id: "c".to_string(),
            score: 0.7,
            metadata: None,
        };

        let result = QueryResult::from_match(with_text).unwrap();
        assert_eq!(result.text(), Some("x"));
        assert!(QueryResult::from_match(empty_meta).is_none());
        assert!(QueryResult::from_match(no_meta).is_none());
    }
}
