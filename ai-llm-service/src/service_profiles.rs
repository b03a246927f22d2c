//! Shared LLM service with two profiles: `generation` and `embedding`.
//!
//! - Construct once at startup, wrap in `Arc`, hand clients to dependents.
//! - One provider backend per profile; the generation backend serves every
//!   model of the fallback cascade.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # async fn run() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//! let generator = svc.generation_client();
//! let text = generator.generate("Hello", None, 0.7).await;
//! println!("{text}");
//! # Ok(()) }
//! ```

use std::{sync::Arc, time::Duration};

use tracing::info;

use crate::{
    config::{
        default_config::{config_embedding, config_generation, fallback_models},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
        retry_policy::RetryPolicy,
    },
    embedding_client::EmbeddingClient,
    error_handler::AiLlmError,
    generation_client::GenerationClient,
    health_service::{HealthService, HealthStatus},
    images::HttpImageFetcher,
    services::{
        ChatBackend, EmbeddingsProvider, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// Resolved profiles plus the backends built from them.
pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,
    fallbacks: Vec<String>,
    retry: RetryPolicy,

    chat: Arc<dyn ChatBackend>,
    embedder: Arc<dyn EmbeddingsProvider>,
    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service from explicit profiles.
    ///
    /// # Errors
    /// Provider validation (endpoint, API key) or HTTP client construction.
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
        fallbacks: Vec<String>,
        retry: RetryPolicy,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let chat: Arc<dyn ChatBackend> = match generation.provider {
            LlmProvider::Ollama => Arc::new(OllamaService::new(generation.clone())?),
            LlmProvider::OpenAI => Arc::new(OpenAiService::new(generation.clone())?),
        };
        let embedder: Arc<dyn EmbeddingsProvider> = match embedding.provider {
            LlmProvider::Ollama => Arc::new(OllamaService::new(embedding.clone())?),
            LlmProvider::OpenAI => Arc::new(OpenAiService::new(embedding.clone())?),
        };

        info!(
            target: "ai_llm_service::profiles",
            provider = ?generation.provider,
            model = %generation.model,
            fallbacks = fallbacks.len(),
            embedding_model = %embedding.model,
            max_attempts = retry.max_attempts,
            "LLM profiles initialized"
        );

        Ok(Self {
            generation,
            embedding,
            fallbacks,
            retry,
            chat,
            embedder,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Loads both profiles, the fallback list and the retry policy from env.
    pub fn from_env() -> Result<Self, AiLlmError> {
        let generation = config_generation()?;
        let embedding = config_embedding()?;
        let fallbacks = fallback_models(generation.provider);
        let retry = RetryPolicy::from_env()?;
        Self::new(generation, embedding, fallbacks, retry, Some(10))
    }

    /// Cascade client over the generation backend, with image support.
    pub fn generation_client(&self) -> GenerationClient {
        let client = GenerationClient::new(
            self.chat.clone(),
            &self.generation.model,
            &self.fallbacks,
            self.retry,
        );
        let timeout = Duration::from_secs(self.generation.timeout_secs.unwrap_or(30));
        match HttpImageFetcher::new(timeout) {
            Ok(fetcher) => client.with_image_fetcher(Arc::new(fetcher)),
            Err(e) => {
                tracing::warn!(
                    target: "ai_llm_service::profiles",
                    error = %e,
                    "image fetcher unavailable; vision requests will ignore images"
                );
                client
            }
        }
    }

    pub fn embedding_client(&self) -> EmbeddingClient {
        EmbeddingClient::new(self.embedder.clone())
    }

    /// Health snapshot for each distinct profile.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.generation.clone()];
        if self.embedding != self.generation {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// `(generation, embedding)` profiles.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn generation_client_uses_primary_then_fallbacks() {
        let svc = LlmServiceProfiles::new(
            ollama("llama3.1:8b"),
            ollama("nomic-embed-text"),
            vec!["qwen2.5:7b".into(), "llama3.1:8b".into()],
            RetryPolicy::immediate(1),
            Some(1),
        )
        .unwrap();
        assert_eq!(
            svc.generation_client().models(),
            &["llama3.1:8b".to_string(), "qwen2.5:7b".to_string()]
        );
        assert_eq!(svc.profiles().1.model, "nomic-embed-text");
    }

    #[test]
    fn openai_profile_without_key_is_rejected() {
        let mut cfg = ollama("gpt-4o-mini");
        cfg.provider = LlmProvider::OpenAI;
        let res = LlmServiceProfiles::new(
            cfg,
            ollama("nomic-embed-text"),
            Vec::new(),
            RetryPolicy::default(),
            None,
        );
        assert!(res.is_err());
    }
}
