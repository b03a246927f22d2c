//! Provider/model configuration and the retry policy used by the generation cascade.

pub mod default_config;
pub mod llm_model_config;
pub mod llm_provider;
pub mod retry_policy;
