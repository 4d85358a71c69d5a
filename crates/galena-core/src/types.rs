//! Core data types for pages, chunks, retrieval results, and citations.

use serde::{Deserialize, Serialize};

/// Extracted text of a single PDF page.
///
/// Produced once per page during extraction and discarded after chunking.
/// Pages whose extracted text is empty or whitespace-only are skipped at
/// the extraction boundary and never constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Base name of the source file.
    pub file: String,
    /// 1-based page number within the source file.
    pub number: u32,
    /// Text extracted from the page.
    pub text: String,
}

impl Page {
    /// Creates a page record.
    #[must_use]
    pub fn new(file: impl Into<String>, number: u32, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            number,
            text: text.into(),
        }
    }
}

/// A bounded segment of a page's text, the unit of embedding and retrieval.
///
/// Every chunk's text is at most the configured chunk size, except possibly
/// the final chunk of a page. Consecutive chunks within a page overlap by
/// the configured overlap length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Segment text.
    pub text: String,
    /// Base name of the source file.
    pub file: String,
    /// 1-based page number the segment came from.
    pub page: u32,
    /// Deterministic identifier derived from (file, page, chunk index).
    pub chunk_id: String,
}

/// Ranked output of a similarity search, consumed by the query pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedDocument {
    /// Text of the matching chunk.
    pub content: String,
    /// Base name of the source file.
    pub file: String,
    /// 1-based page number.
    pub page: u32,
    /// Identifier of the chunk this passage came from.
    pub chunk_id: String,
}

/// A cited source, deduplicated by (file, page) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Base name of the cited file.
    pub file: String,
    /// 1-based page number.
    pub page: u32,
}

impl SourceCitation {
    /// Creates a citation record.
    #[must_use]
    pub fn new(file: impl Into<String>, page: u32) -> Self {
        Self {
            file: file.into(),
            page,
        }
    }
}

/// Buffered result of a non-streaming query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// Generated answer text.
    pub answer: String,
    /// Sources backing the answer, in first-seen order.
    pub sources: Vec<SourceCitation>,
}

/// Outcome of indexing one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Base name of the ingested file.
    pub file: String,
    /// Number of non-empty pages extracted.
    pub pages: usize,
    /// Number of chunks added to the index.
    pub chunks_indexed: usize,
}

impl IngestSummary {
    /// Human-readable confirmation line for upload responses.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Successfully indexed {} chunks from {}",
            self.chunks_indexed, self.file
        )
    }
}
