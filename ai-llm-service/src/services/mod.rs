//! Provider backends and the low-level traits the clients are built on.

use crate::{BoxFuture, error_handler::AiLlmError, images::InlineImage};

pub mod ollama_service;
pub mod open_ai_service;

/// Single chat call against one named model.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    pub temperature: f32,
    pub images: &'a [InlineImage],
}

impl<'a> ChatRequest<'a> {
    pub fn text(prompt: &'a str, system: Option<&'a str>, temperature: f32) -> Self {
        Self {
            prompt,
            system,
            temperature,
            images: &[],
        }
    }
}

/// A provider able to run one non-streaming chat completion for `model`.
///
/// Errors carry the upstream HTTP status (see [`AiLlmError::status`]) so the
/// caller can decide whether to retry.
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(
        &'a self,
        model: &'a str,
        req: ChatRequest<'a>,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

/// Provider of batch embeddings.
pub trait EmbeddingsProvider: Send + Sync {
    /// Returns one vector per input, in input order.
    fn embed_batch<'a>(
        &'a self,
        inputs: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Vec<f32>>, AiLlmError>>;
}
