//! Health probes for the configured LLM backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`, model looked up in `models[].name`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth, model looked up in `data[].id`
//!
//! [`HealthService::check`] never fails; errors become `ok = false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HealthError, HttpError},
};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Minimal `/api/tags` shape.
#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<NamedModel>,
}

#[derive(Deserialize)]
struct NamedModel {
    name: String,
}

/// Minimal `/v1/models` shape.
#[derive(Deserialize)]
struct OpenAiModels {
    #[serde(default)]
    data: Vec<ModelId>,
}

#[derive(Deserialize)]
struct ModelId {
    id: String,
}

/// Health checker reusing a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Probes one config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.probe(cfg).await {
            Ok(models) => {
                let latency = start.elapsed().as_millis();
                let status = if models.iter().any(|m| m == &cfg.model) {
                    HealthStatus::new(cfg, true, latency, "healthy; model is available")
                } else {
                    HealthStatus::new(cfg, false, latency, "reachable, but model is not listed")
                };
                info!(
                    target: "ai_llm_service::health",
                    provider = %status.provider,
                    model = %cfg.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    target: "ai_llm_service::health",
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Probes every config in order.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(target: "ai_llm_service::health", count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Lists the model names the provider reports.
    async fn probe(&self, cfg: &LlmModelConfig) -> Result<Vec<String>, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let base = cfg.base_url();
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let (url, request) = match cfg.provider {
            LlmProvider::Ollama => {
                let url = format!("{base}/api/tags");
                let req = self.client.get(&url);
                (url, req)
            }
            LlmProvider::OpenAI => {
                let key = cfg
                    .api_key
                    .as_deref()
                    .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
                let url = format!("{base}/v1/models");
                let req = self
                    .client
                    .get(&url)
                    .header(header::AUTHORIZATION, format!("Bearer {key}"));
                (url, req)
            }
        };

        debug!(target: "ai_llm_service::health", provider = ?cfg.provider, "GET {url}");
        let resp = request.timeout(timeout).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError::new(status, url, &body)).into());
        }

        let decode = |e: reqwest::Error| HealthError::Decode(format!("{url}: {e}"));
        let names = match cfg.provider {
            LlmProvider::Ollama => resp
                .json::<OllamaTags>()
                .await
                .map_err(decode)?
                .models
                .into_iter()
                .map(|m| m.name)
                .collect(),
            LlmProvider::OpenAI => resp
                .json::<OpenAiModels>()
                .await
                .map_err(decode)?
                .data
                .into_iter()
                .map(|m| m.id)
                .collect(),
        };
        Ok(names)
    }
}
