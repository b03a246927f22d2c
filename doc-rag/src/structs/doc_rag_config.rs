//! Configuration layer: reads retrieval settings from environment variables
//! and exposes strongly typed configs for ranking and context assembly.

use serde::{Deserialize, Serialize};

use crate::errors::doc_rag_error::DocRagError;

/// Scoring knobs for the relevance ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Weight of the embedding cosine in the combined score.
    pub embed_weight: f32,
    /// Weight of the lexical score in the combined score.
    pub lexical_weight: f32,
    /// Chunks whose trimmed text is shorter than this are skipped.
    pub min_chunk_chars: usize,
    /// Length of the normalized prefix used by the prefix heuristic.
    pub prefix_chars: usize,
    /// Lexical score granted when the prefix heuristic fires.
    pub prefix_score: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            embed_weight: 0.7,
            lexical_weight: 0.3,
            min_chunk_chars: 10,
            prefix_chars: 12,
            prefix_score: 0.5,
        }
    }
}

/// Limits for turning candidates into prompt context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Candidates considered for merging and citations.
    pub top_n: usize,
    /// Maximum passages kept after merging.
    pub max_passages: usize,
    /// Maximum characters of a citation snippet.
    pub snippet_chars: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            top_n: 12,
            max_passages: 20,
            snippet_chars: 200,
        }
    }
}

/// Top-level runtime configuration for retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocRagConfig {
    pub ranker: RankerConfig,
    pub assembler: AssemblerConfig,
}

impl DocRagConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `RAG_EMBED_WEIGHT` (default: 0.7)
    /// - `RAG_LEXICAL_WEIGHT` (default: 0.3)
    /// - `RAG_MIN_CHUNK_CHARS` (default: 10)
    /// - `RAG_TOP_N` (default: 12)
    /// - `RAG_MAX_PASSAGES` (default: 20)
    pub fn from_env() -> Result<Self, DocRagError> {
        let d = Self::default();

        let ranker = RankerConfig {
            embed_weight: read_env("RAG_EMBED_WEIGHT")?.unwrap_or(d.ranker.embed_weight),
            lexical_weight: read_env("RAG_LEXICAL_WEIGHT")?.unwrap_or(d.ranker.lexical_weight),
            min_chunk_chars: read_env("RAG_MIN_CHUNK_CHARS")?.unwrap_or(d.ranker.min_chunk_chars),
            ..d.ranker
        };
        let assembler = AssemblerConfig {
            top_n: read_env("RAG_TOP_N")?.unwrap_or(d.assembler.top_n),
            max_passages: read_env("RAG_MAX_PASSAGES")?.unwrap_or(d.assembler.max_passages),
            ..d.assembler
        };

        let cfg = Self { ranker, assembler };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects weights that would break score monotonicity and empty limits.
    pub fn validate(&self) -> Result<(), DocRagError> {
        let r = &self.ranker;
        for (name, w) in [
            ("RAG_EMBED_WEIGHT", r.embed_weight),
            ("RAG_LEXICAL_WEIGHT", r.lexical_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(DocRagError::InvalidConfig(format!("{name} must be >= 0")));
            }
        }
        if self.assembler.top_n == 0 {
            return Err(DocRagError::InvalidConfig("RAG_TOP_N must be > 0".into()));
        }
        if self.assembler.max_passages == 0 {
            return Err(DocRagError::InvalidConfig(
                "RAG_MAX_PASSAGES must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Reads an optional value from env; blank means unset.
fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, DocRagError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| DocRagError::EnvParse {
                    key: key.into(),
                    value: v,
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = DocRagConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.assembler.top_n, 12);
        assert_eq!(cfg.ranker.prefix_chars, 12);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut cfg = DocRagConfig::default();
        cfg.ranker.lexical_weight = -0.1;
        assert!(matches!(cfg.validate(), Err(DocRagError::InvalidConfig(_))));
    }
}
