//! Resilient text generation over an ordered model cascade.
//!
//! The cascade is an explicit list: the configured primary model first, then
//! the fallbacks (deduplicated, primary never repeated). Each model gets up to
//! `RetryPolicy::max_attempts` calls; only transient failures are retried,
//! with exponential backoff plus jitter between attempts. Anything else moves
//! on to the next model.
//!
//! [`GenerationClient::generate_detailed`] returns a structured
//! [`GenerationOutcome`] so every stage of the cascade can be audited. The
//! plain [`GenerationClient::generate`] never fails: when every model is
//! exhausted it returns [`SERVICE_UNAVAILABLE_MESSAGE`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    BoxFuture, TextGenerator,
    config::retry_policy::RetryPolicy,
    images::{ImageFetcher, InlineImage, fetch_all},
    services::{ChatBackend, ChatRequest},
};

/// Text returned when no model in the cascade produced an answer.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The AI service is temporarily unavailable. Please try again in a moment.";

/// Whether a generated text is the unavailability sentinel.
pub fn is_unavailable(text: &str) -> bool {
    text.trim() == SERVICE_UNAVAILABLE_MESSAGE
}

/// Why one model of the cascade was given up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFailure {
    pub model: String,
    pub attempts: u32,
    /// HTTP status of the last failure, if the upstream answered at all.
    pub last_status: Option<u16>,
    pub last_error: String,
}

/// Structured result of a cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Answered {
        model: String,
        text: String,
        /// Attempts spent on the answering model (1-based).
        attempts: u32,
    },
    Exhausted {
        failures: Vec<ModelFailure>,
    },
}

impl GenerationOutcome {
    /// Collapses the outcome into text, using the sentinel on exhaustion.
    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Answered { text, .. } => text,
            GenerationOutcome::Exhausted { .. } => SERVICE_UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

/// Builds the ordered, deduplicated cascade.
pub fn candidate_models(primary: &str, fallbacks: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(fallbacks.len() + 1);
    for m in std::iter::once(primary).chain(fallbacks.iter().map(String::as_str)) {
        let m = m.trim();
        if !m.is_empty() && !out.iter().any(|x| x == m) {
            out.push(m.to_string());
        }
    }
    out
}

/// Generation client shared across requests (wrap in `Arc`).
pub struct GenerationClient {
    backend: Arc<dyn ChatBackend>,
    models: Vec<String>,
    retry: RetryPolicy,
    images: Option<Arc<dyn ImageFetcher>>,
}

impl GenerationClient {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        primary: &str,
        fallbacks: &[String],
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            models: candidate_models(primary, fallbacks),
            retry,
            images: None,
        }
    }

    /// Enables the vision variant.
    pub fn with_image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.images = Some(fetcher);
        self
    }

    /// The cascade in call order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Runs the cascade and reports which stage answered or why all failed.
    pub async fn generate_detailed(&self, req: ChatRequest<'_>) -> GenerationOutcome {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut failures = Vec::new();

        for model in &self.models {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match self.backend.complete(model, req.clone()).await {
                    Ok(text) => {
                        if !failures.is_empty() || attempt > 1 {
                            info!(
                                target: "ai_llm_service::generation",
                                model = %model,
                                attempt,
                                failed_models = failures.len(),
                                "generation recovered"
                            );
                        }
                        return GenerationOutcome::Answered {
                            model: model.clone(),
                            text,
                            attempts: attempt,
                        };
                    }
                    Err(err) => {
                        let transient = err.is_transient();
                        let status = err.status().map(|s| s.as_u16());
                        if transient && attempt < max_attempts {
                            let delay = self.retry.delay_for(attempt - 1);
                            debug!(
                                target: "ai_llm_service::generation",
                                model = %model,
                                attempt,
                                ?status,
                                delay_ms = delay.as_millis() as u64,
                                "transient failure; backing off"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        warn!(
                            target: "ai_llm_service::generation",
                            model = %model,
                            attempt,
                            ?status,
                            transient,
                            error = %err,
                            "model failed; moving to next candidate"
                        );
                        failures.push(ModelFailure {
                            model: model.clone(),
                            attempts: attempt,
                            last_status: status,
                            last_error: err.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        warn!(
            target: "ai_llm_service::generation",
            models = self.models.len(),
            "all models exhausted; returning unavailability message"
        );
        GenerationOutcome::Exhausted { failures }
    }

    /// Generates text; never fails (see [`SERVICE_UNAVAILABLE_MESSAGE`]).
    pub async fn generate(&self, prompt: &str, system: Option<&str>, temperature: f32) -> String {
        self.generate_detailed(ChatRequest::text(prompt, system, temperature))
            .await
            .into_text()
    }

    /// Vision variant: fetches and inlines every image reference first.
    ///
    /// Failed fetches are dropped. Without a configured fetcher the images
    /// are ignored.
    pub async fn generate_with_images(
        &self,
        prompt: &str,
        system: Option<&str>,
        temperature: f32,
        image_refs: &[String],
    ) -> String {
        let inline: Vec<InlineImage> = match &self.images {
            Some(fetcher) if !image_refs.is_empty() => fetch_all(fetcher.as_ref(), image_refs).await,
            Some(_) => Vec::new(),
            None => {
                if !image_refs.is_empty() {
                    warn!(
                        target: "ai_llm_service::generation",
                        count = image_refs.len(),
                        "no image fetcher configured; ignoring images"
                    );
                }
                Vec::new()
            }
        };

        let req = ChatRequest {
            prompt,
            system,
            temperature,
            images: &inline,
        };
        self.generate_detailed(req).await.into_text()
    }
}

impl TextGenerator for GenerationClient {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: f32,
    ) -> BoxFuture<'a, String> {
        Box::pin(GenerationClient::generate(self, prompt, system, temperature))
    }

    fn generate_with_images<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: f32,
        images: &'a [String],
    ) -> BoxFuture<'a, String> {
        Box::pin(GenerationClient::generate_with_images(
            self,
            prompt,
            system,
            temperature,
            images,
        ))
    }
}
