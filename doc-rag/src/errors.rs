pub mod doc_rag_error;
