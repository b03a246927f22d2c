use crate::config::llm_provider::LlmProvider;

/// Configuration for one provider endpoint and its primary model.
///
/// # Fields
///
/// - `provider`: Which LLM provider/backend to use (Ollama or OpenAI-compatible).
/// - `model`: Primary model identifier (e.g., `"gpt-4o-mini"`, `"llama3.1:8b"`).
/// - `endpoint`: Base URL of the provider API.
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `top_p`: Nucleus sampling cutoff. Temperature is chosen per call.
/// - `timeout_secs`: Optional request timeout in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Endpoint without trailing slashes, ready for path concatenation.
    pub fn base_url(&self) -> String {
        self.endpoint.trim().trim_end_matches('/').to_string()
    }
}
