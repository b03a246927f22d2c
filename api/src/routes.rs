use axum::http::HeaderMap;

pub mod ask;
pub mod health;
pub mod quiz;

/// Caller-supplied request id, or `-`.
pub(crate) fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
}
