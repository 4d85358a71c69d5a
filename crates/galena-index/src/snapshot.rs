//! Versioned on-disk snapshot of the vector index.

use bincode::config::standard as bincode_config;
use bincode::{Decode, Encode, decode_from_slice, encode_to_vec};
use galena_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::task::spawn_blocking;
use tracing::info;

/// File name of the snapshot inside the data directory.
const SNAPSHOT_FILE: &str = "index.bin";

/// One indexed chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct IndexEntry {
    /// Embedding vector of the chunk text.
    pub embedding: Vec<f32>,
    /// Chunk text.
    pub text: String,
    /// Base name of the source file.
    pub file: String,
    /// 1-based page number within the source file.
    pub page: u32,
    /// Deterministic chunk identifier.
    pub chunk_id: String,
}

/// Serialized form of the index.
#[derive(Debug, Serialize, Deserialize, Encode, Decode)]
pub struct IndexSnapshot {
    /// Version identifier for snapshot invalidation.
    pub version: u32,
    /// Indexed entries in insertion order.
    pub entries: Vec<IndexEntry>,
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            entries: Vec::default(),
        }
    }
}

impl IndexSnapshot {
    /// Snapshot version identifier.
    pub const VERSION: u32 = 1;

    /// Check if the snapshot version matches the current format.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.version == Self::VERSION
    }
}

/// Reads and writes index snapshots under a data directory.
pub struct SnapshotStore {
    /// Snapshot file path.
    snapshot_path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            snapshot_path: data_dir.join(SNAPSHOT_FILE),
        }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Whether a snapshot file exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    /// Load the snapshot from disk.
    ///
    /// # Errors
    /// Returns [`Error::Persistence`] if the file cannot be read or decoded.
    pub async fn load(&self) -> Result<IndexSnapshot> {
        let data = async_fs::read(&self.snapshot_path)
            .await
            .map_err(|error| Error::Persistence(format!("Failed to read snapshot: {error}")))?;

        // Decode in a blocking task (CPU-bound operation).
        let snapshot = spawn_blocking(move || {
            decode_from_slice(&data, bincode_config())
                .map_err(|error| Error::Persistence(format!("Failed to decode snapshot: {error}")))
                .map(|(snapshot, _)| snapshot)
        })
        .await
        .map_err(|error| Error::Persistence(format!("Task join error: {error}")))??;

        Ok(snapshot)
    }

    /// Write a snapshot containing `entries` to disk.
    ///
    /// # Errors
    /// Returns [`Error::Persistence`] if the data directory cannot be
    /// created, encoding fails, or the write fails.
    pub async fn save(&self, entries: Vec<IndexEntry>) -> Result<()> {
        let snapshot = IndexSnapshot {
            version: IndexSnapshot::VERSION,
            entries,
        };

        let bytes = spawn_blocking(move || {
            encode_to_vec(&snapshot, bincode_config())
                .map_err(|error| Error::Persistence(format!("Failed to encode snapshot: {error}")))
        })
        .await
        .map_err(|error| Error::Persistence(format!("Task join error: {error}")))??;

        self.write_bytes(&bytes).await?;
        info!(
            "saved index snapshot ({} bytes) to {}",
            bytes.len(),
            self.snapshot_path.display()
        );
        Ok(())
    }

    /// Writes snapshot bytes, creating the data directory on first failure.
    async fn write_bytes(&self, data: &[u8]) -> Result<()> {
        if let Err(write_error) = async_fs::write(&self.snapshot_path, data).await {
            if let Some(parent) = self.snapshot_path.parent() {
                async_fs::create_dir_all(parent).await.map_err(|error| {
                    Error::Persistence(format!("Failed to create data directory: {error}"))
                })?;
            }
            async_fs::write(&self.snapshot_path, data)
                .await
                .map_err(|error| {
                    Error::Persistence(format!(
                        "Failed to write snapshot to {}: {error}. Prior error: {write_error}",
                        self.snapshot_path.display()
                    ))
                })?;
        }
        Ok(())
    }
}
