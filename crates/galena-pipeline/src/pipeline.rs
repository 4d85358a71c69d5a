//! Streaming query pipeline over the document index.
//!
//! A query runs retrieval, prompt assembly, and generation in sequence.
//! The streaming path never fails the stream itself: retrieval and
//! generation errors surface as an inline notice, and every stream ends
//! with the citation marker so consumers can rely on its presence.

use crate::context::{
    EMPTY_INDEX_ANSWER, EMPTY_INDEX_STREAM_NOTICE, citation_marker, extract_citations,
    format_context,
};
use galena_core::prompt::build_prompt;
use galena_core::{AnswerSender, AnswerStream, Generator, QueryAnswer, Result};
use galena_index::{EmbeddingProvider, OllamaEmbeddingClient, SharedIndex};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Retrieval-augmented query pipeline.
///
/// Holds shared handles only, so clones are cheap and every clone answers
/// against the same index.
pub struct QueryPipeline<E: EmbeddingProvider = OllamaEmbeddingClient> {
    /// Shared vector index searched per query.
    index: SharedIndex<E>,
    /// Generation provider producing answer text.
    generator: Arc<dyn Generator>,
    /// Number of passages retrieved per query.
    top_k: usize,
}

impl<E: EmbeddingProvider> Clone for QueryPipeline<E> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            generator: Arc::clone(&self.generator),
            top_k: self.top_k,
        }
    }
}

impl<E: EmbeddingProvider + 'static> QueryPipeline<E> {
    /// Creates a pipeline over a shared index and generation provider.
    #[must_use]
    pub fn new(index: SharedIndex<E>, generator: Arc<dyn Generator>, top_k: usize) -> Self {
        Self {
            index,
            generator,
            top_k,
        }
    }

    /// Answers a question as a fragment stream.
    ///
    /// The stream always terminates with the sources marker followed by the
    /// citation JSON. Retrieval and generation failures are reported inline
    /// in the stream rather than aborting it.
    #[must_use]
    pub fn answer_stream(&self, question: &str) -> AnswerStream {
        let (sender, stream) = AnswerStream::channel();
        let pipeline = self.clone();
        let question = question.to_owned();
        tokio::spawn(async move {
            pipeline.run_stream(&question, &sender).await;
        });
        stream
    }

    /// Answers a question and buffers the full response.
    ///
    /// # Errors
    /// Returns an error when retrieval, prompt assembly, or generation
    /// fails. An empty index is not an error; it yields a fixed notice with
    /// no sources.
    pub async fn answer(&self, question: &str) -> Result<QueryAnswer> {
        let documents = {
            let index = self.index.read().await;
            index.search(question, self.top_k).await?
        };

        if documents.is_empty() {
            return Ok(QueryAnswer {
                answer: EMPTY_INDEX_ANSWER.to_owned(),
                sources: Vec::new(),
            });
        }

        let citations = extract_citations(&documents);
        let context = format_context(&documents);
        let prompt = build_prompt(&context, question)?;
        let answer = self.generator.generate(&prompt).await?;

        Ok(QueryAnswer {
            answer,
            sources: citations,
        })
    }

    /// Runs one streamed query to completion, stopping early only when the
    /// consumer drops the stream.
    async fn run_stream(&self, question: &str, sender: &AnswerSender) {
        let retrieved = {
            let index = self.index.read().await;
            index.search(question, self.top_k).await
        };

        let documents = match retrieved {
            Ok(documents) => documents,
            Err(error) => {
                warn!("Retrieval failed: {error}");
                sender.send(format!("\n\nError: {error}")).await;
                sender.send(citation_marker(&[])).await;
                return;
            }
        };

        if documents.is_empty() {
            debug!("Query received with no indexed documents");
            sender.send(EMPTY_INDEX_STREAM_NOTICE).await;
            sender.send(citation_marker(&[])).await;
            return;
        }

        let citations = extract_citations(&documents);
        let context = format_context(&documents);

        let prompt = match build_prompt(&context, question) {
            Ok(prompt) => prompt,
            Err(error) => {
                error!("Prompt assembly failed: {error}");
                sender.send(format!("\n\nError: {error}")).await;
                sender.send(citation_marker(&citations)).await;
                return;
            }
        };

        debug!(
            provider = self.generator.name(),
            passages = documents.len(),
            "Streaming answer"
        );

        let mut tokens = self.generator.generate_stream(&prompt).await;
        while let Some(token) = tokens.next_token().await {
            match token {
                Ok(fragment) => {
                    if !sender.send(fragment).await {
                        return;
                    }
                }
                Err(error) => {
                    warn!("Generation stream failed: {error}");
                    sender.send(format!("\n\nError: {error}")).await;
                    break;
                }
            }
        }

        sender.send(citation_marker(&citations)).await;
    }
}
