//! Image references for the vision variant of text generation.
//!
//! A reference is either an `http(s)://` URL, fetched over HTTP, or a
//! `data:<mime>;base64,<payload>` URI, decoded in place. Everything ends up as
//! an [`InlineImage`] carrying base64 data ready to attach to a chat request.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header;
use tracing::{debug, warn};

use crate::{
    BoxFuture,
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind},
};

const DEFAULT_MIME: &str = "image/png";

/// Image payload attached inline to a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: String,
    /// Standard base64 (no `data:` prefix).
    pub base64_data: String,
}

impl InlineImage {
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            base64_data: STANDARD.encode(bytes),
        }
    }

    /// `data:` URI form used by OpenAI-compatible `image_url` parts.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64_data)
    }

    /// Parses a `data:<mime>;base64,<payload>` URI. Returns `None` for anything else.
    pub fn parse_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.trim().strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        // Reject payloads that are not valid base64.
        STANDARD.decode(payload.trim()).ok()?;
        Some(Self {
            mime: if mime.is_empty() { DEFAULT_MIME } else { mime }.to_string(),
            base64_data: payload.trim().to_string(),
        })
    }
}

/// Resolves an image reference into inline data.
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<InlineImage, AiLlmError>>;
}

/// [`ImageFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AiLlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<InlineImage, AiLlmError>> {
        Box::pin(async move {
            if reference.trim_start().starts_with("data:") {
                return InlineImage::parse_data_uri(reference).ok_or_else(|| {
                    decode_error("malformed data URI (expected data:<mime>;base64,<payload>)")
                });
            }

            debug!(target: "ai_llm_service::images", url = %reference, "GET image");
            let resp = self.client.get(reference).send().await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(ProviderError::new(
                    Provider::ImageHost,
                    ProviderErrorKind::HttpStatus(HttpError::new(status, reference, &body)),
                )
                .into());
            }

            let mime = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(DEFAULT_MIME).trim().to_string())
                .filter(|m| m.starts_with("image/"))
                .unwrap_or_else(|| DEFAULT_MIME.to_string());
            let bytes = resp.bytes().await?;
            Ok(InlineImage::from_bytes(mime, &bytes))
        })
    }
}

/// Fetches every reference, dropping (and logging) the ones that fail.
pub async fn fetch_all(fetcher: &dyn ImageFetcher, references: &[String]) -> Vec<InlineImage> {
    let mut out = Vec::with_capacity(references.len());
    for r in references {
        match fetcher.fetch(r).await {
            Ok(img) => out.push(img),
            Err(e) => warn!(
                target: "ai_llm_service::images",
                reference = %truncate_ref(r),
                error = %e,
                "image fetch failed; dropping image"
            ),
        }
    }
    out
}

fn decode_error(msg: &str) -> AiLlmError {
    ProviderError::new(Provider::ImageHost, ProviderErrorKind::Decode(msg.to_string())).into()
}

/// Keeps data URIs out of the logs.
fn truncate_ref(r: &str) -> String {
    r.chars().take(64).collect()
}
