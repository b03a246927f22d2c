//! Runtime configuration loaded from environment variables.

use doc_rag::DocRagConfig;

use crate::error::ContextorError;

/// Config bag for the answer pipeline. All fields have defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextorConfig {
    pub retrieval: DocRagConfig,

    /// Top retrieval score below which the answer counts as general knowledge.
    pub low_confidence: f32,
    /// Character budget for the context block of a prompt.
    pub max_ctx_chars: usize,
    /// Sampling temperature for answers.
    pub temperature: f32,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            retrieval: DocRagConfig::default(),
            low_confidence: 0.01,
            max_ctx_chars: 8500,
            temperature: 0.4,
        }
    }
}

impl ContextorConfig {
    /// Build from environment variables with defaults.
    ///
    /// Reads `RAG_LOW_CONFIDENCE`, `MAX_CTX_CHARS`, `ANSWER_TEMPERATURE` and the
    /// retrieval variables of [`DocRagConfig::from_env`].
    pub fn from_env() -> Result<Self, ContextorError> {
        let d = Self::default();
        Ok(Self {
            retrieval: DocRagConfig::from_env()?,
            low_confidence: parse("RAG_LOW_CONFIDENCE")?.unwrap_or(d.low_confidence),
            max_ctx_chars: parse("MAX_CTX_CHARS")?.unwrap_or(d.max_ctx_chars),
            temperature: parse("ANSWER_TEMPERATURE")?.unwrap_or(d.temperature),
        })
    }
}

fn parse<T: std::str::FromStr>(k: &str) -> Result<Option<T>, ContextorError> {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse()
                .map(Some)
                .map_err(|_| ContextorError::EnvParse {
                    key: k.to_string(),
                    value: v,
                })
        }
        _ => Ok(None),
    }
}
