//! Document ingestion: PDF text extraction and deterministic chunking.
//!
//! This crate turns uploaded PDF bytes into per-page text and splits that
//! text into overlapping fixed-size chunks ready for embedding.

/// Sliding-window chunking of page text.
pub mod chunker;
/// Per-page text extraction from PDF bytes.
pub mod pdf;

pub use chunker::Chunker;
pub use pdf::{document_name, extract_pages, extract_text, is_pdf_file_name};
