//! Grader configuration loaded from environment variables.

use crate::errors::quiz_error::QuizError;

/// Knobs for grading, scoring and quiz generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraderConfig {
    /// Cosine similarity at or above which a one-word answer is accepted.
    pub similarity_threshold: f32,
    /// Maximum concurrent non-MCQ gradings per attempt.
    pub concurrency: usize,
    /// Temperature for quiz generation calls. Grading always uses 0.
    pub generation_temperature: f32,
    /// Character budget of document text fed to quiz generation.
    pub generation_max_chars: usize,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.78,
            concurrency: 4,
            generation_temperature: 0.5,
            generation_max_chars: 12_000,
        }
    }
}

impl GraderConfig {
    /// Reads `GRADER_SIMILARITY_THRESHOLD`, `GRADER_CONCURRENCY`,
    /// `QUIZ_TEMPERATURE` and `QUIZ_MAX_CHARS`, falling back to defaults.
    pub fn from_env() -> Result<Self, QuizError> {
        let d = Self::default();
        let cfg = Self {
            similarity_threshold: read("GRADER_SIMILARITY_THRESHOLD")?
                .unwrap_or(d.similarity_threshold),
            concurrency: read("GRADER_CONCURRENCY")?.unwrap_or(d.concurrency),
            generation_temperature: read("QUIZ_TEMPERATURE")?.unwrap_or(d.generation_temperature),
            generation_max_chars: read("QUIZ_MAX_CHARS")?.unwrap_or(d.generation_max_chars),
        };

        if !(0.0..=1.0).contains(&cfg.similarity_threshold) {
            return Err(QuizError::InvalidConfig(
                "GRADER_SIMILARITY_THRESHOLD must be within 0..=1".into(),
            ));
        }
        if cfg.concurrency == 0 {
            return Err(QuizError::InvalidConfig(
                "GRADER_CONCURRENCY must be > 0".into(),
            ));
        }
        Ok(cfg)
    }
}

fn read<T: std::str::FromStr>(key: &str) -> Result<Option<T>, QuizError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse()
                .map(Some)
                .map_err(|_| QuizError::EnvParse {
                    key: key.into(),
                    value: v,
                })
        }
        _ => Ok(None),
    }
}
