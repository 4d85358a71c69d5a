//! Shared fixtures for pipeline integration tests.
//!
//! Embeddings are deterministic (content hash-based), so identical texts
//! embed identically and retrieval order is stable without a running
//! Ollama instance.

use galena_core::{Error, Generator, Result};
use galena_index::{DocumentIndex, Embedding, EmbeddingProvider};
use galena_ingest::Chunker;
use galena_pipeline::RagService;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash as _, Hasher as _};
use std::path::Path;
use std::sync::Arc;

/// Deterministic 384-dimension embedding seeded from a text hash.
fn hash_embedding(text: &str) -> Embedding {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let hash = hasher.finish();

    let mut vector = Vec::with_capacity(384);
    for dimension in 0..384u64 {
        let value = (hash.wrapping_add(dimension) % 1000) as f32 / 1000.0;
        vector.push(value);
    }
    vector
}

/// Hash-based embedding client for tests.
pub struct FakeEmbedder;

impl EmbeddingProvider for FakeEmbedder {
    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(hash_embedding(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|text| hash_embedding(text)).collect())
    }
}

/// Embedder that indexes fine but fails every query embedding.
pub struct BrokenQueryEmbedder;

impl EmbeddingProvider for BrokenQueryEmbedder {
    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Err(Error::Embedding(format!(
            "query embedding unavailable for {text:?}"
        )))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|text| hash_embedding(text)).collect())
    }
}

/// Builds a service over a fresh or reloaded index in `data_dir`.
pub async fn service_over<E: EmbeddingProvider + 'static>(
    data_dir: &Path,
    embedder: E,
    generator: Arc<dyn Generator>,
) -> RagService<E> {
    let index = DocumentIndex::load(data_dir, embedder).await;
    let chunker = Chunker::new(200, 40).expect("valid chunker");
    RagService::new(index, generator, chunker, 4)
}

/// Builds a service with the hash-based embedder.
pub async fn service_with(data_dir: &Path, generator: Arc<dyn Generator>) -> RagService<FakeEmbedder> {
    service_over(data_dir, FakeEmbedder, generator).await
}

/// Builds an in-memory PDF with one page per entry in `page_texts`.
pub fn pdf_bytes(page_texts: &[&str]) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let encoded = Content { operations }.encode().expect("encode content");
        let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.compress();

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).expect("serialize PDF");
    bytes
}
