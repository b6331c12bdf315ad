//! Store command handler.
//!
//! Embeds raw texts, or a file split into overlapping chunks, and stores
//! them in one namespace.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use vectorlink_store::chunker::{chunk_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use vectorlink_store::{Namespace, VectorStore};

/// Embed and store texts
#[derive(Args, Debug)]
pub struct StoreCommand {
    /// Texts to store, one record each
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub texts: Vec<String>,

    /// Read and chunk a text file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Characters per chunk when reading a file
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Target namespace
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StoreCommand {
    fn chunks(&self) -> anyhow::Result<Vec<String>> {
        match &self.file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(chunk_text(&text, self.chunk_size, self.chunk_overlap)?)
            }
            None => Ok(self.texts.clone()),
        }
    }

    pub async fn execute(&self, store: &VectorStore) -> anyhow::Result<()> {
        let chunks = self.chunks()?;
        let namespace = Namespace::new(self.namespace.as_str());

        tracing::info!(
            "Storing {} chunks in namespace '{}'",
            chunks.len(),
            namespace
        );
        store.store_texts(&chunks, &namespace).await?;

        if self.json {
            let output = serde_json::json!({
                "index": store.index_name(),
                "namespace": namespace.as_str(),
                "stored": chunks.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Stored {} chunks in '{}' (namespace '{}')",
                chunks.len(),
                store.index_name(),
                namespace
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn command(texts: Vec<String>, file: Option<PathBuf>) -> StoreCommand {
        StoreCommand {
            texts,
            file,
            chunk_size: 4,
            chunk_overlap: 1,
            namespace: "default".to_string(),
            json: false,
        }
    }

    #[test]
    fn test_texts_pass_through() {
        let cmd = command(vec!["one".to_string(), "two".to_string()], None);
        assert_eq!(cmd.chunks().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_file_is_chunked() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "abcdefg").unwrap();

        let cmd = command(vec![], Some(file.path().to_path_buf()));
        assert_eq!(cmd.chunks().unwrap(), vec!["abcd", "defg", "g"]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let cmd = command(vec![], Some(PathBuf::from("/no/such/vectorlink/input.txt")));
        let err = cmd.chunks().unwrap_err();
        assert!(format!("{:#}", err).contains("input.txt"));
    }
}
