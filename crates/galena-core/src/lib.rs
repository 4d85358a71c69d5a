//! Core types and traits for the Galena retrieval-augmented QA service.
//!
//! This crate provides the shared data model, error handling, configuration,
//! capability traits, and streaming channel types used across the workspace.

/// Configuration for chunking, indexing, and capability providers.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Prompt template loading and slot filling.
pub mod prompt;
/// Channel-backed token and answer streams.
pub mod streaming;
/// Synchronization utilities for handling poisoned locks.
pub mod sync;
/// Trait definitions for generation providers.
pub mod traits;
/// Core data types for pages, chunks, retrieval results, and citations.
pub mod types;

pub use config::{ChunkingConfig, EmbeddingConfig, GalenaConfig, GenerationConfig, IndexConfig};
pub use error::{Error, Result};
pub use streaming::{AnswerSender, AnswerStream, TokenSender, TokenStream};
pub use sync::IgnoreLock;
pub use traits::Generator;
pub use types::{Chunk, IngestSummary, Page, QueryAnswer, RetrievedDocument, SourceCitation};
