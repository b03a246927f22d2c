//! Error type for the quiz-grader crate.
//!
//! Grading and parsing never fail; only configuration and explicit
//! validation of caller input do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// Failed to parse an environment variable into the expected type.
    #[error("[Quiz Grader] failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration value outside its allowed range.
    #[error("[Quiz Grader] invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller input that cannot be scored (e.g. answers longer than questions).
    #[error("[Quiz Grader] invalid input: {0}")]
    InvalidInput(String),
}
