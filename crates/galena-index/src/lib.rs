//! Persistent vector index with embedding-backed similarity search.
//!
//! Chunks are embedded through an [`EmbeddingProvider`], held in memory in
//! insertion order, and snapshotted to disk after every mutation.

/// Embedding provider trait and the Ollama-backed client.
pub mod embedding;
/// In-memory index with top-k cosine similarity search.
pub mod index;
/// Versioned on-disk snapshot of the index.
pub mod snapshot;

pub use embedding::{Embedding, EmbeddingProvider, OllamaEmbeddingClient};
pub use index::{DocumentIndex, SharedIndex};
pub use snapshot::{IndexEntry, IndexSnapshot, SnapshotStore};
