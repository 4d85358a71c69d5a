//! Query flow: streaming answers, citations, fallbacks, and failures.

use crate::support::{BrokenQueryEmbedder, pdf_bytes, service_over, service_with};
use galena_core::{Error, SourceCitation};
use galena_pipeline::{EMPTY_INDEX_ANSWER, EMPTY_INDEX_STREAM_NOTICE, SOURCES_MARKER};
use galena_providers::MockGenerator;
use serde_json::from_str;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

#[tokio::test]
async fn test_empty_index_streams_notice_without_generation() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["never sent"]);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let text = service
        .query_stream("What does the act require?")
        .collect_text()
        .await;

    assert_eq!(text, format!("{EMPTY_INDEX_STREAM_NOTICE}\n\n[SOURCES][]"));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_empty_index_buffered_answer() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["never sent"]);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let answer = service.query("What does the act require?").await.expect("query");

    assert_eq!(answer.answer, EMPTY_INDEX_ANSWER);
    assert!(answer.sources.is_empty());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_stream_ends_with_citation_marker() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["Ventilation must ", "be continuous."]);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&[
        "Ventilation must be continuous in all workings",
        "Rescue rooms are required below 300 metres",
    ]);
    service
        .ingest_pdf("mines_act.pdf", &bytes)
        .await
        .expect("ingest");

    let text = service
        .query_stream("What does the act say about ventilation?")
        .collect_text()
        .await;

    let (answer, payload) = text.split_once(SOURCES_MARKER).expect("marker present");
    assert_eq!(answer, "Ventilation must be continuous.");
    assert_eq!(text.matches(SOURCES_MARKER).count(), 1);

    let citations: Vec<SourceCitation> = from_str(payload).expect("citation JSON");
    assert_eq!(citations.len(), 2);
    assert!(citations.iter().all(|citation| citation.file == "mines_act.pdf"));

    let mut pages: Vec<u32> = citations.iter().map(|citation| citation.page).collect();
    pages.sort_unstable();
    assert_eq!(pages, vec![1, 2]);
}

#[tokio::test]
async fn test_prompt_carries_labelled_context_and_question() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["Answer."]);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&[
        "Ventilation must be continuous in all workings",
        "Rescue rooms are required below 300 metres",
    ]);
    service
        .ingest_pdf("mines_act.pdf", &bytes)
        .await
        .expect("ingest");

    drop(
        service
            .query_stream("What does the act say about ventilation?")
            .collect_text()
            .await,
    );

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("What does the act say about ventilation?"));
    assert!(prompt.contains("[Source 1: mines_act.pdf, Page"));
    assert!(prompt.contains("Ventilation must be continuous in all workings"));
    assert!(prompt.contains("Rescue rooms are required below 300 metres"));
}

/// A generation failure mid-stream surfaces inline and the stream still
/// terminates with the citation marker.
#[tokio::test]
async fn test_generation_failure_reported_inline_before_marker() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new()
        .with_tokens(&["The act says "])
        .with_failure("upstream closed");
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&["Explosives must be stored in a licensed magazine"]);
    service
        .ingest_pdf("explosives.pdf", &bytes)
        .await
        .expect("ingest");

    let text = service
        .query_stream("Where are explosives stored?")
        .collect_text()
        .await;

    assert!(text.starts_with("The act says "));
    assert!(text.contains("\n\nError: Provider error: upstream closed"));
    assert_eq!(text.matches(SOURCES_MARKER).count(), 1);

    let (_, payload) = text.split_once(SOURCES_MARKER).expect("marker present");
    let citations: Vec<SourceCitation> = from_str(payload).expect("citation JSON");
    assert!(!citations.is_empty());
}

#[tokio::test]
async fn test_retrieval_failure_reported_inline() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["never sent"]);
    let service = service_over(dir.path(), BrokenQueryEmbedder, Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&["Explosives must be stored in a licensed magazine"]);
    service
        .ingest_pdf("explosives.pdf", &bytes)
        .await
        .expect("ingest");

    let text = service
        .query_stream("Where are explosives stored?")
        .collect_text()
        .await;

    assert!(text.starts_with("\n\nError: Embedding error:"));
    assert!(text.ends_with("\n\n[SOURCES][]"));
    assert_eq!(generator.call_count(), 0);

    let result = service.query("Where are explosives stored?").await;
    assert!(matches!(result, Err(Error::Embedding(_))));
}

/// Streamed and buffered answers agree on text and sources for the same
/// question.
#[tokio::test]
async fn test_stream_and_buffered_answers_agree() {
    let dir = TempDir::new().expect("temp dir");
    let generator = MockGenerator::new().with_tokens(&["Shot firing ", "needs a certificate."]);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&[
        "Blasting requires a shot firer holding a valid certificate",
        "Misfires must be reported to the manager immediately",
    ]);
    service
        .ingest_pdf("blasting.pdf", &bytes)
        .await
        .expect("ingest");

    let question = "Who may fire a shot?";
    let text = service.query_stream(question).collect_text().await;
    let buffered = service.query(question).await.expect("query");

    let (answer, payload) = text.split_once(SOURCES_MARKER).expect("marker present");
    let citations: Vec<SourceCitation> = from_str(payload).expect("citation JSON");

    assert_eq!(answer, buffered.answer);
    assert_eq!(citations, buffered.sources);
}

/// Dropping the stream stops generation instead of draining the provider.
///
/// Bounded channels cap how far the producer can run past the consumer, so
/// a long script can never be streamed to completion once the consumer is
/// gone.
#[tokio::test]
async fn test_consumer_disconnect_stops_generation() {
    let dir = TempDir::new().expect("temp dir");
    let script: Vec<String> = (0..200).map(|index| format!("token{index} ")).collect();
    let token_refs: Vec<&str> = script.iter().map(String::as_str).collect();
    let generator = MockGenerator::new().with_tokens(&token_refs);
    let service = service_with(dir.path(), Arc::new(generator.clone())).await;

    let bytes = pdf_bytes(&["The manager keeps a record of every shift"]);
    service
        .ingest_pdf("duties.pdf", &bytes)
        .await
        .expect("ingest");

    let mut stream = service.query_stream("What records does the manager keep?");
    assert!(stream.next_fragment().await.is_some());
    drop(stream);

    sleep(Duration::from_millis(100)).await;
    assert!(generator.streamed_count() < 200);
}
