//! Snapshot persistence across service restarts.

use crate::support::{pdf_bytes, service_with};
use galena_index::SnapshotStore;
use galena_pipeline::SOURCES_MARKER;
use galena_providers::MockGenerator;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

#[tokio::test]
async fn test_index_survives_restart() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = pdf_bytes(&[
        "Winding engines are examined once in every twenty four hours",
        "Cage speed must not exceed the approved maximum",
    ]);

    let first = service_with(dir.path(), Arc::new(MockGenerator::new())).await;
    let summary = first
        .ingest_pdf("winding.pdf", &bytes)
        .await
        .expect("ingest");
    drop(first);

    let generator = MockGenerator::new().with_tokens(&["From the snapshot."]);
    let second = service_with(dir.path(), Arc::new(generator)).await;

    assert!(second.is_indexed().await);
    assert_eq!(second.indexed_chunks().await, summary.chunks_indexed);

    let text = second
        .query_stream("How fast may the cage travel?")
        .collect_text()
        .await;
    let (answer, payload) = text.split_once(SOURCES_MARKER).expect("marker present");
    assert_eq!(answer, "From the snapshot.");
    assert!(payload.contains("winding.pdf"));
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let dir = TempDir::new().expect("temp dir");
    let store = SnapshotStore::new(dir.path());
    fs::write(store.path(), b"not a snapshot")
        .await
        .expect("prepare corrupt snapshot");

    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;
    assert!(!service.is_indexed().await);
}

#[tokio::test]
async fn test_reingest_after_restart_appends() {
    let dir = TempDir::new().expect("temp dir");
    let bytes = pdf_bytes(&["Every mine keeps a plan of its workings"]);

    let first = service_with(dir.path(), Arc::new(MockGenerator::new())).await;
    let summary = first.ingest_pdf("plans.pdf", &bytes).await.expect("ingest");
    drop(first);

    let second = service_with(dir.path(), Arc::new(MockGenerator::new())).await;
    let again = second
        .ingest_pdf("plans.pdf", &bytes)
        .await
        .expect("re-ingest");

    assert_eq!(
        second.indexed_chunks().await,
        summary.chunks_indexed + again.chunks_indexed
    );
}
