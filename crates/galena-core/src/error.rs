use core::result::Result as StdResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for fallible operations across the workspace.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while ingesting documents or answering queries.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// An uploaded document was rejected before any indexing work began.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The PDF parser could not extract text from the byte stream.
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// The embedding capability was unavailable or returned an error.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The generation capability returned an error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The index snapshot could not be saved or loaded.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient failures such as network errors or
    /// upstream capability errors. Nothing in this workspace retries
    /// automatically; retry policy belongs to the transport layer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Provider(_) | Self::Embedding(_)
        )
    }
}
