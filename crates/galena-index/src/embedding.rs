//! Embedding provider trait and the Ollama-backed client.

use galena_core::{EmbeddingConfig, Error, Result};
use ollama_rs::Ollama;
use ollama_rs::error::OllamaError;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use std::future::Future;

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Trait for generating embeddings from text.
pub trait EmbeddingProvider: Send + Sync {
    /// Ensure the embedding model is reachable and present.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be reached or the model is
    /// not installed.
    fn ensure_model_available(&self) -> impl Future<Output = Result<()>> + Send;

    /// Generate an embedding for one text.
    ///
    /// # Errors
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send;

    /// Embed multiple texts in one request.
    ///
    /// # Errors
    /// Returns an error if any embedding generation fails.
    fn embed_batch(
        &self,
        texts: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Embedding>>> + Send;
}

/// Ollama embedding client.
pub struct OllamaEmbeddingClient {
    /// Ollama API handle.
    ollama: Ollama,
    /// Embedding model name.
    model: String,
}

impl OllamaEmbeddingClient {
    /// Creates a client from embedding configuration.
    #[must_use]
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            ollama: Ollama::new(config.host.clone(), config.port),
            model: config.model.clone(),
        }
    }

    /// Maps an Ollama failure to an embedding error with actionable guidance.
    fn embedding_error(&self, error: &OllamaError) -> Error {
        let detail = format!("{error:?}");
        if detail.contains("model") && detail.contains("not found") {
            Error::Embedding(format!(
                "Embedding model '{}' not found. Run: ollama pull {}",
                self.model, self.model
            ))
        } else {
            Error::Embedding(format!("Embedding generation failed: {error}"))
        }
    }
}

impl EmbeddingProvider for OllamaEmbeddingClient {
    async fn ensure_model_available(&self) -> Result<()> {
        let models = match self.ollama.list_local_models().await {
            Ok(models) => models,
            Err(error) => {
                return Err(Error::Embedding(format!(
                    "Failed to connect to Ollama: {error}.\n\nPlease ensure Ollama is installed and running:\n  - Install from: https://ollama.ai\n  - Start with: ollama serve"
                )));
            }
        };

        let model_available = models.iter().any(|model| model.name.contains(&self.model));
        if !model_available {
            return Err(Error::Embedding(format!(
                "Embedding model '{}' is not installed. Run: ollama pull {}",
                self.model, self.model
            )));
        }

        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_owned().into());
        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| self.embedding_error(&error))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embeddings returned".to_owned()))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::default());
        }
        if texts.len() == 1 {
            return Ok(vec![self.embed(&texts[0]).await?]);
        }

        let expected = texts.len();
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), texts.into());
        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| self.embedding_error(&error))?;

        if response.embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "Expected {expected} embeddings, got {}",
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings)
    }
}

/// Test-only deterministic embedding provider.
///
/// Hashes the text into a 384-dimension vector so identical texts embed
/// identically without a running Ollama instance.
#[cfg(test)]
pub struct FakeEmbeddingClient;

#[cfg(test)]
impl EmbeddingProvider for FakeEmbeddingClient {
    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(Self::fake_embedding(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| Self::fake_embedding(text))
            .collect())
    }
}

#[cfg(test)]
impl FakeEmbeddingClient {
    /// Deterministic 384-dimension embedding seeded from a text hash.
    pub fn fake_embedding(text: &str) -> Embedding {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash as _, Hasher as _};

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
}
