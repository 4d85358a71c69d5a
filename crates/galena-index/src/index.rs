//! In-memory vector index with top-k cosine similarity search.

use crate::embedding::{EmbeddingProvider, OllamaEmbeddingClient};
use crate::snapshot::{IndexEntry, IndexSnapshot, SnapshotStore};
use galena_core::{Chunk, Result, RetrievedDocument};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared handle to the document index.
///
/// Ingestion takes the write half; queries take the read half, held across
/// the query embedding call so results reflect one consistent index state.
pub type SharedIndex<E> = Arc<RwLock<DocumentIndex<E>>>;

/// Vector index over document chunks, snapshotted after every mutation.
pub struct DocumentIndex<E: EmbeddingProvider = OllamaEmbeddingClient> {
    /// Indexed entries in insertion order.
    entries: Vec<IndexEntry>,
    /// Embedding capability for chunks and queries.
    embedder: E,
    /// Snapshot reader/writer.
    store: SnapshotStore,
}

impl<E: EmbeddingProvider> DocumentIndex<E> {
    /// Loads the index from `data_dir`, or starts empty.
    ///
    /// A missing snapshot is the normal first-run state. A corrupt or
    /// version-mismatched snapshot is discarded with a warning; the service
    /// keeps starting rather than refusing over stale persistence.
    pub async fn load(data_dir: &Path, embedder: E) -> Self {
        let store = SnapshotStore::new(data_dir);
        let mut entries = Vec::new();

        if store.exists() {
            match store.load().await {
                Ok(snapshot) if snapshot.is_valid() => {
                    entries = snapshot.entries;
                    info!("loaded {} indexed chunks from snapshot", entries.len());
                }
                Ok(snapshot) => {
                    warn!(
                        "discarding index snapshot with version {} (current is {})",
                        snapshot.version,
                        IndexSnapshot::VERSION
                    );
                }
                Err(error) => {
                    warn!("discarding unreadable index snapshot: {error}");
                }
            }
        }

        Self {
            entries,
            embedder,
            store,
        }
    }

    /// Embeds `chunks`, appends them, and persists the snapshot.
    ///
    /// Embedding failure leaves the index untouched. Persistence failure is
    /// reported as an error, but the appended entries stay in memory and
    /// remain searchable.
    ///
    /// # Errors
    /// Returns an error when embedding or persistence fails.
    pub async fn add(&mut self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(texts).await?;

        let added = chunks.len();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.entries.push(IndexEntry {
                embedding,
                text: chunk.text,
                file: chunk.file,
                page: chunk.page,
                chunk_id: chunk.chunk_id,
            });
        }

        self.store.save(self.entries.clone()).await?;
        Ok(added)
    }

    /// Returns the `top_k` entries most similar to `query`, best first.
    ///
    /// An empty index short-circuits to no results without an embedding
    /// call. Ties in similarity preserve insertion order.
    ///
    /// # Errors
    /// Returns an error when the query cannot be embedded.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                (
                    position,
                    cosine_similarity(&query_embedding, &entry.embedding),
                )
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|first, second| second.1.partial_cmp(&first.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(position, _)| {
                let entry = &self.entries[position];
                RetrievedDocument {
                    content: entry.text.clone(),
                    file: entry.file.clone(),
                    page: entry.page,
                    chunk_id: entry.chunk_id.clone(),
                }
            })
            .collect())
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when the lengths differ or either vector is all zeros.
fn cosine_similarity(vector_a: &[f32], vector_b: &[f32]) -> f32 {
    if vector_a.len() != vector_b.len() {
        return 0.0;
    }

    let dot_product: f32 = vector_a
        .iter()
        .zip(vector_b.iter())
        .map(|(left, right)| left * right)
        .sum();
    let magnitude_a = vector_a.iter().map(|value| value * value).sum::<f32>().sqrt();
    let magnitude_b = vector_b.iter().map(|value| value * value).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
