//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are resolved:
//!
//! - **Generation** → the primary chat model plus the fallback cascade
//! - **Embedding**  → the embedding model (may live on a different provider)
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind for generation (`ollama` | `openai`, default `ollama`)
//! - `EMBEDDING_KIND` = provider kind for embeddings (defaults to `LLM_KIND`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64, default 120)
//! - `LLM_FALLBACK_MODELS` = comma-separated fallback models (optional)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory for Ollama)
//! - `OLLAMA_MODEL`                = primary model (mandatory for Ollama)
//!
//! OpenAI-specific:
//! - `OPENAI_URL`     = endpoint (default `https://api.openai.com`)
//! - `OPENAI_API_KEY` = API key (mandatory for OpenAI)
//! - `OPENAI_MODEL`   = primary model (default `gpt-4o-mini`)
//!
//! Embeddings:
//! - `EMBEDDING_MODEL` = embedding model (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint,
    },
};

/// Fallback cascade for Ollama deployments when `LLM_FALLBACK_MODELS` is unset.
pub const OLLAMA_FALLBACK_MODELS: [&str; 5] = [
    "llama3.1:8b",
    "qwen2.5:7b",
    "mistral:7b",
    "gemma2:9b",
    "phi3:mini",
];

/// Fallback cascade for OpenAI-compatible deployments when `LLM_FALLBACK_MODELS` is unset.
pub const OPENAI_FALLBACK_MODELS: [&str; 5] = [
    "gpt-4o-mini",
    "gpt-4.1-mini",
    "gpt-4o",
    "gpt-4.1-nano",
    "gpt-3.5-turbo",
];

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_opt("OPENAI_URL").unwrap_or_else(|| "https://api.openai.com".to_string());
    validate_http_endpoint("OPENAI_URL", &url)?;
    Ok(url)
}

fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    env_opt(var).map_or(Ok(default), |v| LlmProvider::parse(&v))
}

fn base_config(provider: LlmProvider, model: String) -> Result<LlmModelConfig, AiLlmError> {
    let (endpoint, api_key) = match provider {
        LlmProvider::Ollama => (ollama_endpoint()?, None),
        LlmProvider::OpenAI => (openai_endpoint()?, Some(must_env("OPENAI_API_KEY")?)),
    };
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Constructs the **generation** config (primary model of the cascade).
///
/// # Errors
/// Missing endpoint/model/key variables or malformed numbers.
pub fn config_generation() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_KIND", LlmProvider::Ollama)?;
    let model = match provider {
        LlmProvider::Ollama => must_env("OLLAMA_MODEL")?,
        LlmProvider::OpenAI => env_opt("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
    };
    base_config(provider, model)
}

/// Constructs the **embedding** config.
///
/// # Defaults
/// - `timeout_secs = Some(30)`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let generation_kind = provider_from_env("LLM_KIND", LlmProvider::Ollama)?;
    let provider = provider_from_env("EMBEDDING_KIND", generation_kind)?;
    let model = must_env("EMBEDDING_MODEL")?;
    let mut cfg = base_config(provider, model)?;
    cfg.max_tokens = None;
    cfg.timeout_secs = Some(30);
    Ok(cfg)
}

/// Fallback models for the cascade.
///
/// `LLM_FALLBACK_MODELS` (comma-separated) wins; otherwise the built-in list
/// for the provider is used.
pub fn fallback_models(provider: LlmProvider) -> Vec<String> {
    if let Some(list) = env_opt("LLM_FALLBACK_MODELS") {
        return parse_model_list(&list);
    }
    let builtin: &[&str] = match provider {
        LlmProvider::Ollama => &OLLAMA_FALLBACK_MODELS,
        LlmProvider::OpenAI => &OPENAI_FALLBACK_MODELS,
    };
    builtin.iter().map(|m| m.to_string()).collect()
}

/// Splits a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
