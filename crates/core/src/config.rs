//! Configuration management for vectorlink.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.vectorlink/config.yaml` in the workspace, or `VECTORLINK_CONFIG`)
//! - Environment variables
//! - Command-line flags (`AppConfig::with_overrides`)
//!
//! API keys are never stored in the config file itself. The file names the
//! environment variable holding each key (`apiKeyEnv`), and keys are resolved
//! when a client is built.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Dimensionality of indexes created by this layer (OpenAI ada-002 embeddings).
pub const DEFAULT_DIMENSION: usize = 1536;

/// Embedding providers the store crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["openai", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains .vectorlink/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Remote index service settings
    pub pinecone: PineconeSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Settings for the hosted vector index service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PineconeSettings {
    /// Explicit API key; takes precedence over `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Name of the index to manage
    pub index_name: String,

    /// Legacy pod-based project environment. Serverless indexes ignore it;
    /// it is only echoed in startup logs.
    pub environment: Option<String>,

    /// Serverless placement: cloud provider
    pub cloud: String,

    /// Serverless placement: region
    pub region: String,

    /// Vector dimensionality of created indexes
    pub dimension: usize,

    /// Similarity metric of created indexes
    pub metric: String,

    /// Control-plane base URL
    pub controller_url: String,

    /// Value of the `X-Pinecone-API-Version` header
    pub api_version: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: "PINECONE_API_KEY".to_string(),
            index_name: String::new(),
            environment: None,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            dimension: DEFAULT_DIMENSION,
            metric: "cosine".to_string(),
            controller_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PineconeSettings {
    /// Resolve the API key: explicit value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Settings for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// Provider name: "openai" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom API base URL
    pub endpoint: Option<String>,

    /// Explicit API key; takes precedence over `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Texts embedded and upserted per request by `store_texts`
    pub batch_size: usize,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimensions: DEFAULT_DIMENSION,
            endpoint: None,
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 32,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingSettings {
    /// Resolve the API key: explicit value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

fn resolve_key(explicit: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(key) = explicit {
        return Some(key.to_string());
    }
    std::env::var(env_var).ok().filter(|k| !k.is_empty())
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    pinecone: Option<PineconeFile>,
    embedding: Option<EmbeddingFile>,
    logging: Option<LoggingFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PineconeFile {
    api_key_env: Option<String>,
    index_name: Option<String>,
    environment: Option<String>,
    cloud: Option<String>,
    region: Option<String>,
    dimension: Option<usize>,
    metric: Option<String>,
    controller_url: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingFile {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    batch_size: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingFile {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            pinecone: PineconeSettings::default(),
            embedding: EmbeddingSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `VECTORLINK_WORKSPACE`: Override workspace path
    /// - `VECTORLINK_CONFIG`: Path to config file
    /// - `PINECONE_INDEX_NAME`, `PINECONE_ENVIRONMENT`, `PINECONE_CLOUD`, `PINECONE_REGION`
    /// - `VECTORLINK_EMBEDDING_PROVIDER`, `VECTORLINK_EMBEDDING_MODEL`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use vectorlink_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {}", config.pinecone.index_name);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like `load`, with an explicit workspace and config file.
    ///
    /// Explicit paths win over `VECTORLINK_WORKSPACE` and `VECTORLINK_CONFIG`.
    /// The config file is resolved against the final workspace and merged
    /// before environment variables are applied.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(workspace, config_file, |key| std::env::var(key).ok())
    }

    fn load_with<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env("VECTORLINK_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("VECTORLINK_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override the config file
        if let Some(name) = env("PINECONE_INDEX_NAME") {
            config.pinecone.index_name = name;
        }
        if let Some(environment) = env("PINECONE_ENVIRONMENT") {
            config.pinecone.environment = Some(environment);
        }
        if let Some(cloud) = env("PINECONE_CLOUD") {
            config.pinecone.cloud = cloud;
        }
        if let Some(region) = env("PINECONE_REGION") {
            config.pinecone.region = region;
        }
        if let Some(provider) = env("VECTORLINK_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Some(model) = env("VECTORLINK_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }
        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Path of the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.workspace.join(".vectorlink/config.yaml"),
        }
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(p) = file.pinecone {
            let target = &mut result.pinecone;
            if let Some(v) = p.api_key_env {
                target.api_key_env = v;
            }
            if let Some(v) = p.index_name {
                target.index_name = v;
            }
            if p.environment.is_some() {
                target.environment = p.environment;
            }
            if let Some(v) = p.cloud {
                target.cloud = v;
            }
            if let Some(v) = p.region {
                target.region = v;
            }
            if let Some(v) = p.dimension {
                target.dimension = v;
            }
            if let Some(v) = p.metric {
                target.metric = v;
            }
            if let Some(v) = p.controller_url {
                target.controller_url = v;
            }
            if let Some(v) = p.api_version {
                target.api_version = v;
            }
            if let Some(v) = p.timeout_secs {
                target.timeout_secs = v;
            }
        }

        if let Some(e) = file.embedding {
            let target = &mut result.embedding;
            if let Some(v) = e.provider {
                target.provider = v;
            }
            if let Some(v) = e.model {
                target.model = v;
            }
            if let Some(v) = e.dimensions {
                target.dimensions = v;
            }
            if e.endpoint.is_some() {
                target.endpoint = e.endpoint;
            }
            if let Some(v) = e.api_key_env {
                target.api_key_env = v;
            }
            if let Some(v) = e.batch_size {
                target.batch_size = v;
            }
            if let Some(v) = e.timeout_secs {
                target.timeout_secs = v;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    /// Workspace and config file are resolved earlier, by `load_from`.
    pub fn with_overrides(
        mut self,
        index_name: Option<String>,
        embedding_provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(index_name) = index_name {
            self.pinecone.index_name = index_name;
        }

        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the settings needed to talk to the index and embedding services.
    pub fn validate(&self) -> AppResult<()> {
        if self.pinecone.index_name.trim().is_empty() {
            return Err(AppError::Config(
                "Index name not set. Use --index or PINECONE_INDEX_NAME".to_string(),
            ));
        }

        if self.pinecone.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.pinecone.api_key_env
            )));
        }

        if self.pinecone.dimension == 0 {
            return Err(AppError::Config(
                "Index dimension must be greater than zero".to_string(),
            ));
        }

        let provider = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.embedding.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.embedding.api_key_env
            )));
        }

        if self.embedding.dimensions != self.pinecone.dimension {
            return Err(AppError::Config(format!(
                "Dimension mismatch: embeddings produce {}, index expects {}",
                self.embedding.dimensions, self.pinecone.dimension
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
