//! Shared LLM layer: resilient text generation, batch embeddings and health.
//!
//! The crate exposes two boundaries consumed by the rest of the workspace:
//!
//! - [`TextGenerator`]: `prompt (+ images) -> text`, never failing; total
//!   unavailability is reported with [`SERVICE_UNAVAILABLE_MESSAGE`].
//! - [`TextEmbedder`]: `texts -> vectors`, never failing; transport errors
//!   yield one empty vector per input.
//!
//! Production implementations are [`generation_client::GenerationClient`] and
//! [`embedding_client::EmbeddingClient`], both built from env through
//! [`service_profiles::LlmServiceProfiles`].

use std::{future::Future, pin::Pin};

pub mod config;
pub mod embedding_client;
pub mod error_handler;
pub mod generation_client;
pub mod health_service;
pub mod images;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use generation_client::{GenerationOutcome, SERVICE_UNAVAILABLE_MESSAGE, is_unavailable};
pub use images::InlineImage;

/// Boxed future used by the object-safe traits of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// High-level text generation boundary.
///
/// Implementations absorb every upstream failure. When nothing could answer,
/// the returned text equals [`SERVICE_UNAVAILABLE_MESSAGE`].
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: f32,
    ) -> BoxFuture<'a, String>;

    /// Vision variant. `images` are URLs or `data:` URIs.
    fn generate_with_images<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: f32,
        images: &'a [String],
    ) -> BoxFuture<'a, String>;
}

/// High-level embedding boundary. Output has the same length and order as input.
pub trait TextEmbedder: Send + Sync {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>>;
}
