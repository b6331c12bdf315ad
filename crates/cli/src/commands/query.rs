//! Query command handler.

use anyhow::{bail, Context};
use clap::Args;
use vectorlink_store::{Namespace, VectorStore, DEFAULT_TOP_K};

/// Query the index by text or by vector
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Query text, embedded with the configured provider
    #[arg(short, long, required_unless_present = "vector", conflicts_with = "vector")]
    pub text: Option<String>,

    /// Query vector as comma-separated floats
    #[arg(long)]
    pub vector: Option<String>,

    /// Number of neighbours to retrieve
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Namespace to search
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_vector(raw: &str) -> anyhow::Result<Vec<f32>> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .with_context(|| format!("Invalid vector component '{}'", s))
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;

    if values.is_empty() {
        bail!("Query vector is empty");
    }
    Ok(values)
}

impl QueryCommand {
    pub async fn execute(&self, store: &VectorStore) -> anyhow::Result<()> {
        let namespace = Namespace::new(self.namespace.as_str());
        store.ensure_index_ready().await?;

        let results = match (&self.text, &self.vector) {
            (Some(text), _) => store.query_text(text, self.top_k, &namespace).await?,
            (None, Some(raw)) => {
                let vector = parse_vector(raw)?;
                store.query_similar(&vector, self.top_k, &namespace).await?
            }
            (None, None) => bail!("Either --text or --vector is required"),
        };

        tracing::debug!("Query returned {} results", results.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No matches in namespace '{}'", namespace);
            return Ok(());
        }

        for (i, result) in results.iter().enumerate() {
            println!(
                "{}. [{:.4}] {} {}",
                i + 1,
                result.score,
                result.id,
                result.text().unwrap_or_default()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("0.5, -1, 2e-1").unwrap(), vec![0.5, -1.0, 0.2]);
    }

    #[test]
    fn test_parse_vector_rejects_garbage() {
        let err = parse_vector("0.5,abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(parse_vector(" , ").is_err());
    }
}
