//! Lightweight Ollama service for chat generation and batch embeddings.
//!
//! This module implements a thin client for the local Ollama API:
//! - `POST {endpoint}/api/chat`: non-streaming chat (`stream=false`), images as base64 list
//! - `POST {endpoint}/api/embed`: batch embeddings retrieval
//!
//! The service is bound to one endpoint; the chat model is chosen per call so a
//! single instance serves the whole fallback cascade. Embeddings always use
//! `cfg.model`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    BoxFuture,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::{ChatBackend, ChatRequest, EmbeddingsProvider},
};

/// Thin client for Ollama.
///
/// Initialized with a full [`LlmModelConfig`]. Reuses an HTTP client with
/// a configurable timeout.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embed: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        let base = cfg.base_url();
        let url_chat = format!("{base}/api/chat");
        let url_embed = format!("{base}/api/embed");

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embed,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a **non-streaming** chat request via `/api/chat`.
    ///
    /// Mapped options:
    /// - `model`        ← argument
    /// - `num_predict`  ← `self.cfg.max_tokens`
    /// - `temperature`  ← `req.temperature`
    /// - `top_p`        ← `self.cfg.top_p`
    #[instrument(skip_all, fields(model = %model))]
    pub async fn chat(&self, model: &str, req: ChatRequest<'_>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatBody::build(&self.cfg, model, &req);

        debug!(
            target: "ai_llm_service::ollama",
            prompt_len = req.prompt.len(),
            images = req.images.len(),
            "POST {}", self.url_chat
        );
        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(
                target: "ai_llm_service::ollama",
                %status,
                url = %self.url_chat,
                latency_ms = started.elapsed().as_millis(),
                "Ollama /api/chat returned non-success status"
            );
            return Err(ProviderError::http(Provider::Ollama, status, &self.url_chat, &text).into());
        }

        let out: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `message.content` with `stream=false`"
                )),
            )
        })?;

        debug!(
            target: "ai_llm_service::ollama",
            latency_ms = started.elapsed().as_millis(),
            answer_len = out.message.content.len(),
            "chat completed"
        );
        Ok(out.message.content)
    }

    /// Retrieves embeddings for a batch of inputs via `/api/embed`.
    #[instrument(skip_all, fields(model = %self.cfg.model, batch = inputs.len()))]
    pub async fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbedBody {
            model: &self.cfg.model,
            input: inputs,
        };

        debug!(target: "ai_llm_service::ollama", "POST {}", self.url_embed);
        let resp = self.client.post(&self.url_embed).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(
                ProviderError::http(Provider::Ollama, status, &self.url_embed, &text).into(),
            );
        }

        let out: EmbedResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `{{ embeddings: number[][] }}`"
                )),
            )
        })?;

        if out.embeddings.len() != inputs.len() {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    out.embeddings.len()
                )),
            )
            .into());
        }
        Ok(out.embeddings)
    }
}

impl ChatBackend for OllamaService {
    fn complete<'a>(
        &'a self,
        model: &'a str,
        req: ChatRequest<'a>,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(self.chat(model, req))
    }
}

impl EmbeddingsProvider for OllamaService {
    fn embed_batch<'a>(
        &'a self,
        inputs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Vec<f32>>, AiLlmError>> {
        Box::pin(self.embeddings(inputs))
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/chat` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

impl<'a> ChatBody<'a> {
    fn build(cfg: &LlmModelConfig, model: &'a str, req: &ChatRequest<'a>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = req.system {
            messages.push(ChatMessage {
                role: "system",
                content: sys,
                images: None,
            });
        }
        let images = (!req.images.is_empty()).then(|| {
            req.images
                .iter()
                .map(|i| i.base64_data.as_str())
                .collect::<Vec<_>>()
        });
        messages.push(ChatMessage {
            role: "user",
            content: req.prompt,
            images,
        });

        Self {
            model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: Some(req.temperature),
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbedBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::InlineImage;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "nomic-embed-text".into(),
            endpoint: "http://localhost:11434/".into(),
            api_key: None,
            max_tokens: Some(256),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_foreign_provider() {
        let mut c = cfg();
        c.provider = LlmProvider::OpenAI;
        assert!(OllamaService::new(c).is_err());
    }

    #[test]
    fn chat_body_carries_images_and_options() {
        let images = [InlineImage::from_bytes("image/png", b"abc")];
        let req = ChatRequest {
            prompt: "describe",
            system: Some("be brief"),
            temperature: 0.0,
            images: &images,
        };
        let body = serde_json::to_value(ChatBody::build(&cfg(), "llava", &req)).unwrap();
        assert_eq!(body["model"], "llava");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0].get("images").is_none());
        assert_eq!(body["messages"][1]["images"][0], "YWJj");
        assert_eq!(body["options"]["num_predict"], 256);
        assert!(body["options"].get("top_p").is_none());
    }
}
