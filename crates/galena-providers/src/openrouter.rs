//! `OpenRouter` generation adapter (OpenAI-compatible chat completions).

use crate::sse::{SseLineBuffer, StreamChunk};
use async_trait::async_trait;
use futures::StreamExt as _;
use galena_core::{Error, Generator, Result, TokenSender, TokenStream};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::env;
use tracing::debug;

/// `OpenRouter` chat completions endpoint URL.
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Default generation model.
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
/// Env var key for the `OpenRouter` API key.
const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
/// SSE sentinel closing a streaming completion.
const DONE_SENTINEL: &str = "[DONE]";

/// Generator backed by the `OpenRouter` API.
pub struct OpenRouterGenerator {
    /// HTTP client for API requests.
    client: Client,
    /// `OpenRouter` API key.
    api_key: String,
    /// Model identifier sent with every request.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Maximum tokens per completion.
    max_tokens: u32,
}

impl OpenRouterGenerator {
    /// Creates a generator with the given API key.
    ///
    /// # Errors
    /// Returns an error if the provided API key is empty.
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey(ENV_OPENROUTER_API_KEY.to_owned()));
        }

        Ok(Self {
            client: Client::default(),
            api_key,
            model: DEFAULT_MODEL.to_owned(),
            temperature: 0.7,
            max_tokens: 4096,
        })
    }

    /// Creates a generator from environment variables.
    ///
    /// # Errors
    /// Returns an error if the env var is missing.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(ENV_OPENROUTER_API_KEY)
            .map_err(|_| Error::MissingApiKey(ENV_OPENROUTER_API_KEY.to_owned()))?;
        Self::new(api_key)
    }

    /// Creates a generator from a configured key, falling back to the
    /// environment.
    ///
    /// # Errors
    /// Returns an error if no API key is available from either source.
    pub fn from_config_or_env(config_key: Option<String>) -> Result<Self> {
        let api_key = config_key
            .or_else(|| env::var(ENV_OPENROUTER_API_KEY).ok())
            .ok_or_else(|| {
                Error::MissingApiKey(format!(
                    "{ENV_OPENROUTER_API_KEY} or config.toml openrouter_api_key"
                ))
            })?;
        Self::new(api_key)
    }

    /// Sets the model to use for generation.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the completion token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builds the chat completions request body.
    ///
    /// The filled instruction template travels as a single user message.
    fn request_body(&self, prompt: &str, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": stream,
        })
    }
}

/// Response payload returned by the chat completions API.
#[derive(Deserialize)]
struct ChatResponse {
    /// List of generated choices.
    choices: Vec<ChatChoice>,
}

/// Individual completion choice.
#[derive(Deserialize)]
struct ChatChoice {
    /// Message payload with the completion text.
    message: ChatMessage,
}

/// Message structure containing generated content.
#[derive(Deserialize)]
struct ChatMessage {
    /// Text content produced by the model.
    content: String,
}

#[async_trait]
impl Generator for OpenRouterGenerator {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = self.request_body(prompt, false);
        let response = send_request(&self.client, &self.api_key, &body).await?;

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|error| Error::Provider(format!("Failed to parse response: {error}")))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Provider("No response from OpenRouter".to_owned()))
    }

    async fn generate_stream(&self, prompt: &str) -> TokenStream {
        let (sender, stream) = TokenStream::channel();
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let body = self.request_body(prompt, true);

        tokio::spawn(async move {
            stream_completion(&client, &api_key, &body, &sender).await;
        });

        stream
    }
}

/// Sends one completions request and checks the HTTP status.
async fn send_request(client: &Client, api_key: &str, body: &Value) -> Result<reqwest::Response> {
    let response = client
        .post(OPENROUTER_API_URL)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .header("X-Title", "Galena")
        .json(body)
        .send()
        .await
        .map_err(|error| Error::Provider(format!("Request failed: {error}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(Error::Provider(format!(
            "OpenRouter API request failed with status {status}: {error_text}"
        )));
    }

    Ok(response)
}

/// Drives one streaming completion, pushing tokens into `sender`.
///
/// A failed send means the consumer dropped the stream; the task stops
/// pulling bytes from the connection.
async fn stream_completion(client: &Client, api_key: &str, body: &Value, sender: &TokenSender) {
    let response = match send_request(client, api_key, body).await {
        Ok(response) => response,
        Err(error) => {
            sender.fail(error).await;
            return;
        }
    };

    let mut byte_stream = response.bytes_stream();
    let mut lines = SseLineBuffer::new();

    while let Some(piece) = byte_stream.next().await {
        let bytes = match piece {
            Ok(bytes) => bytes,
            Err(error) => {
                sender
                    .fail(Error::Provider(format!("Stream read failed: {error}")))
                    .await;
                return;
            }
        };

        for payload in lines.extend(&bytes) {
            if payload == DONE_SENTINEL {
                debug!("completion stream finished");
                return;
            }
            // Unparseable payloads (processing comments and the like) are
            // skipped rather than ending the stream.
            let Ok(chunk) = serde_json::from_str::<StreamChunk>(&payload) else {
                continue;
            };
            if let Some(content) = chunk.delta_content()
                && !sender.send(content).await
            {
                return;
            }
        }
    }
}
