pub mod chunk;
pub mod doc_rag_config;
pub mod passage;
