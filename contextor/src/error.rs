//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Retrieval configuration errors from doc-rag.
    #[error("RAG error: {0}")]
    Rag(#[from] doc_rag::DocRagError),

    /// LLM layer setup errors (config, client construction).
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::error_handler::AiLlmError),

    /// An env variable is set but cannot be parsed.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },
}
