//! Public API:
//! - `RelevanceRanker::rank`: expand + embed the query, hybrid-score every chunk.
//! - `assemble`: merge adjacent candidates, build context text and citations.
//! - `DocRetriever::retrieve`: both steps with the configured limits.

pub mod errors;
pub mod expand;
pub mod lexical;
pub mod ranker;
pub mod similarity;
pub mod stitcher;
pub mod structs;

use std::sync::Arc;

use ai_llm_service::TextEmbedder;

pub use errors::doc_rag_error::DocRagError;
pub use ranker::RelevanceRanker;
pub use stitcher::assemble;
pub use structs::chunk::{Chunk, ChunkRef, DocumentChunks, RetrievalCandidate};
pub use structs::doc_rag_config::{AssemblerConfig, DocRagConfig, RankerConfig};
pub use structs::passage::{AssembledContext, Citation, MergedPassage};

/// Ranker plus assembler limits, shared across requests.
pub struct DocRetriever {
    ranker: RelevanceRanker,
    assembler: AssemblerConfig,
}

impl DocRetriever {
    pub fn new(embedder: Arc<dyn TextEmbedder>, cfg: DocRagConfig) -> Self {
        Self {
            ranker: RelevanceRanker::new(embedder, cfg.ranker),
            assembler: cfg.assembler,
        }
    }

    /// Ranks `documents` for `query` and assembles the prompt context.
    pub async fn retrieve(&self, query: &str, documents: &[DocumentChunks]) -> AssembledContext {
        let candidates = self.ranker.rank(query, documents).await;
        assemble(&candidates, &self.assembler)
    }
}
