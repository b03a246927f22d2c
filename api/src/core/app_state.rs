use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use contextor::{Contextor, ContextorConfig};
use quiz_grader::{GraderConfig, QuizGenerator, QuizScorer};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Document question answering.
    pub contextor: Contextor,
    /// Attempt grading and rollups.
    pub scorer: QuizScorer,
    /// Quiz generation from document chunks.
    pub quiz_generator: QuizGenerator,
    /// Provider profiles, used for health probes.
    pub llm_profiles: Arc<LlmServiceProfiles>,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let llm_profiles = Arc::new(LlmServiceProfiles::from_env()?);
        let grader_cfg = GraderConfig::from_env()?;

        Ok(Self {
            contextor: Contextor::from_profiles(&llm_profiles, ContextorConfig::from_env()?),
            scorer: QuizScorer::from_profiles(&llm_profiles, &grader_cfg),
            quiz_generator: QuizGenerator::new(
                Arc::new(llm_profiles.generation_client()),
                &grader_cfg,
            ),
            llm_profiles,
        })
    }
}
