//! Unified error type for the doc-rag crate.

use thiserror::Error;

/// Errors produced by the retrieval module.
///
/// Ranking itself never fails; only configuration can.
#[derive(Debug, Error)]
pub enum DocRagError {
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
