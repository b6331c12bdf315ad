//! Init command handler.

use clap::Args;
use vectorlink_store::VectorStore;

/// Create the configured index if missing
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InitCommand {
    pub async fn execute(&self, store: &VectorStore) -> anyhow::Result<()> {
        tracing::info!("Ensuring index '{}' is ready", store.index_name());

        let handle = store.ensure_index_ready().await?;

        if self.json {
            let output = serde_json::json!({
                "index": handle.name,
                "host": handle.host,
                "dimension": handle.dimension,
                "metric": handle.metric.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Index '{}' ready at {} ({} dims, {})",
                handle.name,
                handle.host,
                handle.dimension,
                handle.metric.as_str()
            );
        }

        Ok(())
    }
}
