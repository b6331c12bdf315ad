//! Pinecone index service over its REST API.
//!
//! Control-plane calls (list, create, describe) go to `controller_url`;
//! data-plane calls (upsert, query) go to the per-index host returned by
//! describe. Every request carries the `api-key` and
//! `x-pinecone-api-version` headers.
//!
//! API reference: https://docs.pinecone.io/reference/api/introduction

use crate::service::IndexService;
use crate::types::{
    IndexDescription, IndexHandle, IndexMetric, IndexSpec, Metadata, Namespace, QueryRequest,
    ScoredMatch, VectorRecord,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use vectorlink_core::{AppError, AppResult, PineconeSettings};

/// Pinecone client.
#[derive(Debug, Clone)]
pub struct PineconeService {
    client: Client,
    controller_url: String,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: IndexMetric,
    spec: CreateIndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct CreateIndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    dimension: usize,
    metric: IndexMetric,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    ready: bool,
}

impl From<IndexModel> for IndexDescription {
    fn from(model: IndexModel) -> Self {
        Self {
            name: model.name,
            dimension: model.dimension,
            metric: model.metric,
            host: model.host,
            ready: model.status.map(|s| s.ready).unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// Error payloads come either as `{"error": {"message": ...}}` or `{"message": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl PineconeService {
    /// Build a client from settings.
    ///
    /// # Errors
    /// * `AppError::Config` - If no API key can be resolved or it is not a valid header
    pub fn from_settings(settings: &PineconeSettings) -> AppResult<Self> {
        let api_key = settings.resolve_api_key().ok_or_else(|| {
            AppError::Config(format!(
                "API key not found in environment variable: {}",
                settings.api_key_env
            ))
        })?;

        let mut headers = HeaderMap::new();
        let mut key_header = HeaderValue::from_str(&api_key)
            .map_err(|e| AppError::Config(format!("Invalid Pinecone API key: {}", e)))?;
        key_header.set_sensitive(true);
        headers.insert("api-key", key_header);
        headers.insert(
            "x-pinecone-api-version",
            HeaderValue::from_str(&settings.api_version)
                .map_err(|e| AppError::Config(format!("Invalid API version: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            controller_url: settings.controller_url.trim_end_matches('/').to_string(),
        })
    }

    fn controller(&self, path: &str) -> String {
        format!("{}{}", self.controller_url, path)
    }

    /// Data-plane URL for an index host; hosts are returned without a scheme.
    fn data_plane(host: &str, path: &str) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host.trim_end_matches('/'), path)
        } else {
            format!("https://{}{}", host, path)
        }
    }

    /// Turn a non-success response into `AppError::Remote`.
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(AppError::remote(status.as_u16(), error_message(&error_text)))
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: Some(err), ..
        }) => err.message,
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        _ => body.to_string(),
    }
}

/// Map a failed create-index response; 409 means the name is already taken.
fn map_create_status(status: StatusCode, name: &str, body: &str) -> AppResult<()> {
    if status == StatusCode::CONFLICT {
        return Err(AppError::IndexConflict(name.to_string()));
    }
    Err(AppError::remote(status.as_u16(), error_message(body)))
}

fn transport_error(e: reqwest::Error) -> AppError {
    AppError::transport(format!("Failed to reach Pinecone: {}", e))
}

fn decode_error(e: reqwest::Error) -> AppError {
    AppError::transport(format!("Failed to parse Pinecone response: {}", e))
}

#[async_trait]
impl IndexService for PineconeService {
    fn service_name(&self) -> &str {
        "pinecone"
    }

    #[instrument(skip(self))]
    async fn list_indexes(&self) -> AppResult<Vec<IndexDescription>> {
        let response = self
            .client
            .get(self.controller("/indexes"))
            .send()
            .await
            .map_err(transport_error)?;

        let list: IndexList = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        debug!("Pinecone reports {} indexes", list.indexes.len());
        Ok(list.indexes.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, spec), fields(index = %spec.name))]
    async fn create_index(&self, spec: &IndexSpec) -> AppResult<()> {
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: spec.metric,
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let response = self
            .client
            .post(self.controller("/indexes"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!("Created index '{}'", spec.name);
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        map_create_status(status, &spec.name, &error_text)
    }

    #[instrument(skip(self))]
    async fn describe_index(&self, name: &str) -> AppResult<IndexDescription> {
        let response = self
            .client
            .get(self.controller(&format!("/indexes/{}", name)))
            .send()
            .await
            .map_err(transport_error)?;

        let model: IndexModel = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self, index, records), fields(index = %index.name, count = records.len()))]
    async fn upsert(
        &self,
        index: &IndexHandle,
        records: &[VectorRecord],
        namespace: &Namespace,
    ) -> AppResult<usize> {
        let body = UpsertRequest {
            vectors: records,
            namespace: namespace.as_str(),
        };

        let response = self
            .client
            .post(Self::data_plane(&index.host, "/vectors/upsert"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let upserted: UpsertResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(upserted.upserted_count)
    }

    #[instrument(skip(self, index, request), fields(index = %index.name, top_k = request.top_k))]
    async fn query(
        &self,
        index: &IndexHandle,
        request: &QueryRequest,
    ) -> AppResult<Vec<ScoredMatch>> {
        let body = QueryBody {
            vector: &request.vector,
            top_k: request.top_k,
            namespace: request.namespace.as_str(),
            include_metadata: request.include_metadata,
            include_values: false,
        };

        let response = self
            .client
            .post(Self::data_plane(&index.host, "/query"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let result: QueryResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| ScoredMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}
