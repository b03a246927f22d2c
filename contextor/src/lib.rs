//! Document question answering over retrieved context.
//!
//! Public API: [`Contextor::ask`]. It checks for small talk, ranks and
//! assembles context from the documents in scope, routes the question to a
//! prompt branch, calls the generation client (vision variant when images are
//! attached) and returns the answer with citations.

mod api_types;
mod cfg;
mod error;
pub mod intent;
pub mod prompt;

use std::{sync::Arc, time::Instant};

use ai_llm_service::{TextGenerator, is_unavailable, service_profiles::LlmServiceProfiles};
use doc_rag::{AssembledContext, DocRetriever};
use tracing::{info, warn};

pub use api_types::{
    AnswerDepth, AskOptions, ChatRole, ChatTurn, DocumentScope, Intent, QaAnswer,
};
pub use cfg::ContextorConfig;
pub use error::ContextorError;

/// Answer pipeline shared across requests.
pub struct Contextor {
    retriever: DocRetriever,
    generator: Arc<dyn TextGenerator>,
    cfg: ContextorConfig,
}

impl Contextor {
    pub fn new(
        retriever: DocRetriever,
        generator: Arc<dyn TextGenerator>,
        cfg: ContextorConfig,
    ) -> Self {
        Self {
            retriever,
            generator,
            cfg,
        }
    }

    /// Wires the pipeline to the shared LLM profiles.
    pub fn from_profiles(svc: &LlmServiceProfiles, cfg: ContextorConfig) -> Self {
        let retriever = DocRetriever::new(Arc::new(svc.embedding_client()), cfg.retrieval.clone());
        Self::new(retriever, Arc::new(svc.generation_client()), cfg)
    }

    pub fn config(&self) -> &ContextorConfig {
        &self.cfg
    }

    /// Answers `question` against `scope`.
    ///
    /// Never fails: upstream outages surface as the generation client's
    /// unavailability message in `answer`.
    pub async fn ask(&self, question: &str, scope: &DocumentScope, opts: &AskOptions) -> QaAnswer {
        let started = Instant::now();
        let documents = scope.documents();

        // Greetings skip retrieval entirely.
        let ctx = match documents {
            Some(docs) if !intent::is_greeting(question) => {
                self.retriever.retrieve(question, docs).await
            }
            _ => AssembledContext::default(),
        };

        let routed = prompt::route(
            question,
            documents.is_some(),
            &ctx,
            opts.depth,
            self.cfg.max_ctx_chars,
        );

        let answer = if opts.images.is_empty() {
            self.generator
                .generate(&routed.prompt, Some(routed.system.as_str()), self.cfg.temperature)
                .await
        } else {
            self.generator
                .generate_with_images(
                    &routed.prompt,
                    Some(routed.system.as_str()),
                    self.cfg.temperature,
                    &opts.images,
                )
                .await
        };

        let used_general = match routed.intent {
            Intent::Greeting => false,
            Intent::General | Intent::GeneralWithDocument => true,
            _ => ctx.top_score < self.cfg.low_confidence,
        };
        let citations = if routed.intent.is_grounded() {
            ctx.citations
        } else {
            Vec::new()
        };

        if is_unavailable(&answer) {
            warn!(
                target: "contextor::ask",
                intent = ?routed.intent,
                "generation unavailable; returning fallback message"
            );
        }
        info!(
            target: "contextor::ask",
            intent = ?routed.intent,
            used_general,
            citations = citations.len(),
            images = opts.images.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "question answered"
        );

        QaAnswer {
            answer,
            citations,
            used_general,
            intent: routed.intent,
        }
    }
}
