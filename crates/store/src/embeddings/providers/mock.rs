//! Mock embedding provider using hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use std::collections::HashMap;
use vectorlink_core::AppResult;

/// Deterministic, content-aware embeddings for tests and offline runs.
///
/// Each token contributes its boundary-padded character trigrams and the
/// whole token to hashed dimensions, then the vector is normalized. Texts
/// sharing tokens land close under cosine similarity; texts sharing nothing
/// are (almost always) orthogonal. Not semantically meaningful.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, bytes: impl Iterator<Item = u8>, seed: u64) -> usize {
        let hash = bytes.fold(seed, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
        (hash as usize) % self.dimensions
    }

    fn generate_mock_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        let mut token_freq: HashMap<&str, u32> = HashMap::new();
        for token in lower.split_whitespace() {
            *token_freq.entry(token).or_insert(0) += 1;
        }

        for (token, freq) in &token_freq {
            // '^' and '$' mark token boundaries so one-letter tokens still produce a trigram
            let padded: Vec<char> = std::iter::once('^')
                .chain(token.chars())
                .chain(std::iter::once('$'))
                .collect();

            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = self.bucket(trigram.bytes(), 7);
                embedding[dim] += (*freq as f32).sqrt();
            }

            let dim = self.bucket(token.bytes(), 11);
            embedding[dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "hash-trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_mock_embedding(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_mock_provider_embed_batch() {
        let provider = MockProvider::new(1536);
        let texts = vec![
            "hello world".to_string(),
            "a".to_string(),
            "rust programming".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 1536);
            assert!((norm(embedding) - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_mock_provider_deterministic() {
        let provider = MockProvider::new(384);

        let embedding1 = provider.embed("deterministic test").await.unwrap();
        let embedding2 = provider.embed("deterministic test").await.unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_mock_provider_single_letters_differ() {
        let provider = MockProvider::new(1536);

        let a = provider.embed("a").await.unwrap();
        let b = provider.embed("b").await.unwrap();

        assert_ne!(a, b);
        assert!(a.iter().any(|&x| x != 0.0));
    }

    #[tokio::test]
    async fn test_mock_provider_empty_text() {
        let provider = MockProvider::new(384);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_mock_provider_utf8_safety() {
        let provider = MockProvider::new(384);

        let embedding = provider.embed("Gamedex é um aplicativo 🎮 brasileiro").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
