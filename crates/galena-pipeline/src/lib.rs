//! Retrieval-augmented query pipeline and document ingestion service.
//!
//! Ties together chunking, the vector index, and a generation provider:
//! [`RagService`] ingests PDF documents into the index, and
//! [`QueryPipeline`] answers questions against the indexed content with
//! source citations.

/// Context assembly and citation formatting.
pub mod context;
/// Streaming query pipeline.
pub mod pipeline;
/// Document ingestion and query service.
pub mod service;

pub use context::{EMPTY_INDEX_ANSWER, EMPTY_INDEX_STREAM_NOTICE, SOURCES_MARKER};
pub use pipeline::QueryPipeline;
pub use service::RagService;
