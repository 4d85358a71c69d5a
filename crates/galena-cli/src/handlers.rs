//! Command handlers for the galena binary.

use anyhow::{Context as _, Result};
use galena_core::GalenaConfig;
use galena_index::{DocumentIndex, EmbeddingProvider as _, OllamaEmbeddingClient};
use galena_ingest::{Chunker, extract_text};
use galena_pipeline::RagService;
use galena_providers::OpenRouterGenerator;
use std::io::{Write as _, stdout};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Assembles the full service from configuration.
///
/// The generation credential check runs before the embedding backend is
/// contacted, so a missing key fails without any network traffic.
async fn build_service(config: &GalenaConfig) -> Result<RagService<OllamaEmbeddingClient>> {
    let generator = OpenRouterGenerator::from_config_or_env(config.openrouter_api_key())?
        .with_model(config.generation.model.clone())
        .with_temperature(config.generation.temperature)
        .with_max_tokens(config.generation.max_tokens);

    let embedder = OllamaEmbeddingClient::from_config(&config.embedding);
    embedder.ensure_model_available().await?;

    let index = DocumentIndex::load(&config.index.data_dir, embedder).await;
    let chunker = Chunker::from_config(&config.chunking)?;

    Ok(RagService::new(
        index,
        Arc::new(generator),
        chunker,
        config.index.top_k,
    ))
}

/// Indexes one PDF document into the local store.
///
/// # Errors
/// Returns an error when configuration, capability setup, file reading, or
/// indexing fails.
pub async fn handle_ingest(file: &Path) -> Result<()> {
    let config = GalenaConfig::load_or_create()?;
    let service = build_service(&config).await?;

    info!("Ingesting {}", file.display());
    let bytes = fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = service.ingest_pdf(&file.to_string_lossy(), &bytes).await?;

    #[allow(clippy::print_stdout, reason = "Command output")]
    {
        println!("{}", summary.message());
    }
    Ok(())
}

/// Answers a question against the indexed documents.
///
/// Streaming mode writes the raw answer stream to stdout, including the
/// trailing citation marker; buffered mode prints the answer followed by a
/// source list.
///
/// # Errors
/// Returns an error when configuration, capability setup, or (in buffered
/// mode) the query itself fails.
pub async fn handle_ask(question: &str, buffered: bool) -> Result<()> {
    let config = GalenaConfig::load_or_create()?;
    let service = build_service(&config).await?;

    if buffered {
        let answer = service.query(question).await?;
        #[allow(clippy::print_stdout, reason = "Command output")]
        {
            println!("{}", answer.answer);
            if !answer.sources.is_empty() {
                println!("\nSources:");
                for source in &answer.sources {
                    println!("  {} (page {})", source.file, source.page);
                }
            }
        }
        return Ok(());
    }

    let mut stream = service.query_stream(question);
    let mut out = stdout();
    while let Some(fragment) = stream.next_fragment().await {
        write!(out, "{fragment}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

/// Prints a PDF's extracted text without touching the index.
///
/// # Errors
/// Returns an error when the file cannot be read or parsed.
pub async fn handle_extract(file: &Path) -> Result<()> {
    let bytes = fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let text = extract_text(&bytes)?;

    #[allow(clippy::print_stdout, reason = "Command output")]
    {
        println!("{text}");
    }
    Ok(())
}

/// Reports the index location and how many chunks it holds.
///
/// # Errors
/// Returns an error when the configuration cannot be loaded.
pub async fn handle_status() -> Result<()> {
    let config = GalenaConfig::load_or_create()?;
    let embedder = OllamaEmbeddingClient::from_config(&config.embedding);
    let index = DocumentIndex::load(&config.index.data_dir, embedder).await;

    #[allow(clippy::print_stdout, reason = "Command output")]
    {
        println!("Data directory: {}", config.index.data_dir.display());
        println!("Indexed chunks: {}", index.len());
    }
    Ok(())
}

/// Prints the effective configuration with credentials redacted.
///
/// # Errors
/// Returns an error when the configuration cannot be loaded or rendered.
pub fn handle_config() -> Result<()> {
    let path = GalenaConfig::config_path()?;
    let config = GalenaConfig::load_or_create()?;

    let key_present = config.openrouter_api_key().is_some();
    let mut redacted = config;
    redacted.api_keys.openrouter_api_key = None;
    let rendered = toml::to_string_pretty(&redacted)?;

    #[allow(clippy::print_stdout, reason = "Command output")]
    {
        println!("Config file: {}", path.display());
        println!();
        print!("{rendered}");
        println!();
        println!(
            "OpenRouter API key: {}",
            if key_present { "configured" } else { "not set" }
        );
    }
    Ok(())
}
