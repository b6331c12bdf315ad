//! Vectorlink CLI
//!
//! Main entry point for the vectorlink command-line tool.
//! Sets up a hosted vector index, stores text and vectors in it and runs
//! similarity queries.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{InitCommand, QueryCommand, StoreCommand, UpsertCommand};
use std::path::PathBuf;
use vectorlink_core::{
    config::AppConfig,
    logging::{self, LogFormat},
};
use vectorlink_store::VectorStore;

/// Vectorlink CLI - store and search embeddings in a hosted vector index
#[derive(Parser, Debug)]
#[command(name = "vectorlink")]
#[command(about = "Store and search embeddings in a hosted vector index", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "VECTORLINK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Index name (overrides PINECONE_INDEX_NAME)
    #[arg(short, long, global = true)]
    index: Option<String>,

    /// Embedding provider (openai, mock)
    #[arg(short, long, global = true)]
    embedding_provider: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the index if it does not exist yet
    Init(InitCommand),

    /// Embed texts (or a chunked file) and store them
    Store(StoreCommand),

    /// Upsert precomputed vectors from a JSON file
    Upsert(UpsertCommand),

    /// Query the index by text or by vector
    Query(QueryCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init(_) => "init",
            Commands::Store(_) => "store",
            Commands::Upsert(_) => "upsert",
            Commands::Query(_) => "query",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(
            cli.index,
            cli.embedding_provider,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Index: {}", config.pinecone.index_name);
    if let Some(environment) = &config.pinecone.environment {
        tracing::debug!("Pinecone environment: {} (ignored by serverless indexes)", environment);
    }
    tracing::debug!("Embedding provider: {}", config.embedding.provider);

    config.validate().context("Invalid configuration")?;
    let store = VectorStore::from_config(&config).context("Failed to set up vector store")?;

    let command_name = cli.command.name();
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Init(cmd) => cmd.execute(&store).await,
        Commands::Store(cmd) => cmd.execute(&store).await,
        Commands::Upsert(cmd) => cmd.execute(&store).await,
        Commands::Query(cmd) => cmd.execute(&store).await,
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result.with_context(|| format!("vectorlink {} failed", command_name))
}
