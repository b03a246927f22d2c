//! Embedding client that degrades instead of failing.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{BoxFuture, TextEmbedder, services::EmbeddingsProvider};

/// Wraps a batch [`EmbeddingsProvider`].
///
/// On any provider failure each input gets an empty vector, so callers can
/// fall back to lexical-only scoring. No retry.
#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingsProvider>,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingsProvider>) -> Self {
        Self { provider }
    }

    /// Embeds `texts`; output has the same length and order as the input.
    pub async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.provider.embed_batch(texts).await {
            Ok(vectors) if vectors.len() == texts.len() => {
                debug!(
                    target: "ai_llm_service::embedding",
                    count = texts.len(),
                    dim = vectors.first().map(Vec::len).unwrap_or(0),
                    "embeddings computed"
                );
                vectors
            }
            Ok(vectors) => {
                warn!(
                    target: "ai_llm_service::embedding",
                    expected = texts.len(),
                    got = vectors.len(),
                    "embedding count mismatch; returning empty vectors"
                );
                vec![Vec::new(); texts.len()]
            }
            Err(e) => {
                warn!(
                    target: "ai_llm_service::embedding",
                    count = texts.len(),
                    error = %e,
                    "embedding call failed; returning empty vectors"
                );
                vec![Vec::new(); texts.len()]
            }
        }
    }
}

impl TextEmbedder for EmbeddingClient {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
        Box::pin(EmbeddingClient::embed(self, texts))
    }
}
