//! Document ingestion and query facade.

use crate::pipeline::QueryPipeline;
use galena_core::{AnswerStream, Error, Generator, IngestSummary, QueryAnswer, Result};
use galena_index::{DocumentIndex, EmbeddingProvider, OllamaEmbeddingClient, SharedIndex};
use galena_ingest::{Chunker, document_name, extract_pages, is_pdf_file_name};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Service tying document ingestion and question answering to one index.
pub struct RagService<E: EmbeddingProvider = OllamaEmbeddingClient> {
    /// Shared vector index, written by ingestion and read by queries.
    index: SharedIndex<E>,
    /// Query pipeline over the same index.
    pipeline: QueryPipeline<E>,
    /// Chunker applied to extracted pages.
    chunker: Chunker,
}

impl<E: EmbeddingProvider + 'static> RagService<E> {
    /// Creates a service over a loaded index and generation provider.
    #[must_use]
    pub fn new(
        index: DocumentIndex<E>,
        generator: Arc<dyn Generator>,
        chunker: Chunker,
        top_k: usize,
    ) -> Self {
        let index = Arc::new(RwLock::new(index));
        let pipeline = QueryPipeline::new(Arc::clone(&index), generator, top_k);
        Self {
            index,
            pipeline,
            chunker,
        }
    }

    /// Ingests one PDF into the index and persists the updated snapshot.
    ///
    /// Re-ingesting the same file appends its chunks again; the index keeps
    /// no per-file registry.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDocument`] when the file name is not a PDF or
    /// no text could be extracted, [`Error::Extraction`] when the bytes
    /// cannot be parsed, and embedding or persistence errors when indexing
    /// fails.
    pub async fn ingest_pdf(&self, file_name: &str, bytes: &[u8]) -> Result<IngestSummary> {
        if !is_pdf_file_name(file_name) {
            return Err(Error::InvalidDocument(
                "Only PDF files are supported".to_owned(),
            ));
        }

        let name = document_name(file_name);
        let pages = extract_pages(&name, bytes)?;
        if pages.is_empty() {
            return Err(Error::InvalidDocument(
                "No text could be extracted from this PDF".to_owned(),
            ));
        }

        let page_count = pages.len();
        let chunks = self.chunker.chunk_pages(&pages);

        let chunks_indexed = {
            let mut index = self.index.write().await;
            index.add(chunks).await?
        };

        info!(
            file = %name,
            pages = page_count,
            chunks = chunks_indexed,
            "Indexed document"
        );

        Ok(IngestSummary {
            file: name,
            pages: page_count,
            chunks_indexed,
        })
    }

    /// Streams an answer for `question`.
    ///
    /// The stream always ends with the citation marker; see
    /// [`QueryPipeline::answer_stream`].
    #[must_use]
    pub fn query_stream(&self, question: &str) -> AnswerStream {
        self.pipeline.answer_stream(question)
    }

    /// Answers `question` and buffers the full response.
    ///
    /// # Errors
    /// Returns an error when retrieval, prompt assembly, or generation
    /// fails.
    pub async fn query(&self, question: &str) -> Result<QueryAnswer> {
        self.pipeline.answer(question).await
    }

    /// Whether at least one chunk has been indexed.
    pub async fn is_indexed(&self) -> bool {
        !self.index.read().await.is_empty()
    }

    /// Number of chunks currently indexed.
    pub async fn indexed_chunks(&self) -> usize {
        self.index.read().await.len()
    }
}
