//! Upsert command handler.

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use vectorlink_store::{Namespace, VectorRecord, VectorStore};

/// Upsert precomputed vectors
#[derive(Args, Debug)]
pub struct UpsertCommand {
    /// JSON file holding an array of `{"id", "values", "metadata"}` records
    pub file: PathBuf,

    /// Target namespace
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn read_records(path: &Path) -> anyhow::Result<Vec<VectorRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse vector records in {}", path.display()))
}

impl UpsertCommand {
    pub async fn execute(&self, store: &VectorStore) -> anyhow::Result<()> {
        let records = read_records(&self.file)?;
        let namespace = Namespace::new(self.namespace.as_str());

        store.ensure_index_ready().await?;
        let upserted = store.upsert_vectors(&records, &namespace).await?;

        if self.json {
            let output = serde_json::json!({
                "index": store.index_name(),
                "namespace": namespace.as_str(),
                "upserted": upserted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Upserted {} vectors into '{}' (namespace '{}')",
                upserted,
                store.index_name(),
                namespace
            );
        }

        Ok(())
    }
}
