//! Ingestion flow: validation order, chunk accounting, and re-ingestion.

use crate::support::{pdf_bytes, service_with};
use galena_core::Error;
use galena_providers::MockGenerator;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_ingest_reports_pages_and_chunks() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let bytes = pdf_bytes(&[
        "Ventilation must be maintained in every working below ground",
        "Blasting requires a shot firer holding a valid certificate",
    ]);
    let summary = service
        .ingest_pdf("mines_act.pdf", &bytes)
        .await
        .expect("ingest");

    assert_eq!(summary.file, "mines_act.pdf");
    assert_eq!(summary.pages, 2);
    assert!(summary.chunks_indexed >= 2);
    assert_eq!(
        summary.message(),
        format!(
            "Successfully indexed {} chunks from mines_act.pdf",
            summary.chunks_indexed
        )
    );
    assert!(service.is_indexed().await);
    assert_eq!(service.indexed_chunks().await, summary.chunks_indexed);
}

#[tokio::test]
async fn test_non_pdf_extension_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let result = service.ingest_pdf("notes.txt", b"plain text").await;
    match result {
        Err(Error::InvalidDocument(message)) => {
            assert_eq!(message, "Only PDF files are supported");
        }
        other => panic!("expected InvalidDocument, got {other:?}"),
    }
    assert!(!service.is_indexed().await);
}

/// The extension check runs before any parsing, so valid PDF bytes under a
/// wrong name never reach the parser.
#[tokio::test]
async fn test_extension_checked_before_parsing() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let bytes = pdf_bytes(&["Perfectly valid page text"]);
    let result = service.ingest_pdf("report.docx", &bytes).await;
    assert!(matches!(result, Err(Error::InvalidDocument(_))));
}

#[tokio::test]
async fn test_pdf_without_text_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let bytes = pdf_bytes(&[""]);
    let result = service.ingest_pdf("scanned.pdf", &bytes).await;
    match result {
        Err(Error::InvalidDocument(message)) => {
            assert_eq!(message, "No text could be extracted from this PDF");
        }
        other => panic!("expected InvalidDocument, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_bytes_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let result = service.ingest_pdf("bogus.pdf", b"definitely not a pdf").await;
    assert!(matches!(result, Err(Error::Extraction(_))));
    assert!(!service.is_indexed().await);
}

/// The index keeps no per-file registry, so re-ingesting the same document
/// appends its chunks again.
#[tokio::test]
async fn test_reingest_appends_chunks() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let bytes = pdf_bytes(&["Rescue stations shall be provided within 25 kilometres"]);
    let first = service
        .ingest_pdf("rescue_rules.pdf", &bytes)
        .await
        .expect("first ingest");
    let second = service
        .ingest_pdf("rescue_rules.pdf", &bytes)
        .await
        .expect("second ingest");

    assert_eq!(first.chunks_indexed, second.chunks_indexed);
    assert_eq!(
        service.indexed_chunks().await,
        first.chunks_indexed + second.chunks_indexed
    );
}

#[tokio::test]
async fn test_upload_path_reduced_to_base_name() {
    let dir = TempDir::new().expect("temp dir");
    let service = service_with(dir.path(), Arc::new(MockGenerator::new())).await;

    let bytes = pdf_bytes(&["Shaft inspection intervals"]);
    let summary = service
        .ingest_pdf("uploads/2019/dgms_circular.pdf", &bytes)
        .await
        .expect("ingest");

    assert_eq!(summary.file, "dgms_circular.pdf");
}
