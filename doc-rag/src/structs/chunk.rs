use serde::{Deserialize, Serialize};

/// One chunk of an uploaded document as supplied by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based page the chunk starts on.
    pub page: u32,
    pub text: String,
    /// Precomputed embedding. `None` degrades this chunk to lexical-only scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// All chunks of one document, in document order.
///
/// The index of a chunk in `chunks` is its chunk index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunks {
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

/// Stable pointer to a chunk inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkRef {
    pub document_id: String,
    pub title: String,
    pub chunk_index: usize,
    pub page: u32,
}

/// A scored chunk for one query. Request-scoped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalCandidate {
    pub chunk_ref: ChunkRef,
    pub text: String,
    pub embedding_score: f32,
    pub lexical_score: f32,
    pub combined_score: f32,
}
