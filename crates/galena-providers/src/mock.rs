//! Scripted generator for testing query pipelines.
//!
//! Streams canned tokens and optional scripted failures, enabling
//! end-to-end pipeline tests without real API calls.

use async_trait::async_trait;
use galena_core::{Error, Generator, IgnoreLock as _, Result, TokenStream};
use std::sync::{Arc, Mutex};

/// Generator that replays a scripted token sequence.
///
/// Clones share the same script and prompt history, so a test can hold one
/// handle for assertions while the pipeline owns another.
#[derive(Clone, Default)]
pub struct MockGenerator {
    /// Tokens streamed in order (and joined on the buffered path).
    tokens: Arc<Mutex<Vec<String>>>,
    /// Failure delivered after the scripted tokens, if set.
    failure: Arc<Mutex<Option<String>>>,
    /// Prompts received, for verification.
    prompts: Arc<Mutex<Vec<String>>>,
    /// Tokens actually delivered to a consumer, for verification.
    streamed: Arc<Mutex<usize>>,
}

impl MockGenerator {
    /// Creates a generator with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the tokens to stream.
    #[must_use]
    pub fn with_tokens(self, tokens: &[&str]) -> Self {
        {
            let mut scripted = self.tokens.lock_ignore_poison();
            *scripted = tokens.iter().map(|token| (*token).to_owned()).collect();
        }
        self
    }

    /// Scripts a provider failure delivered after the tokens.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        {
            let mut failure = self.failure.lock_ignore_poison();
            *failure = Some(message.into());
        }
        self
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        let prompts = self.prompts.lock_ignore_poison();
        prompts.clone()
    }

    /// Number of generation calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        let prompts = self.prompts.lock_ignore_poison();
        prompts.len()
    }

    /// Number of tokens delivered to stream consumers so far.
    #[must_use]
    pub fn streamed_count(&self) -> usize {
        let streamed = self.streamed.lock_ignore_poison();
        *streamed
    }

    /// Records a prompt for later verification.
    fn record_prompt(&self, prompt: &str) {
        let mut prompts = self.prompts.lock_ignore_poison();
        prompts.push(prompt.to_owned());
    }

    /// Snapshot of the scripted tokens.
    fn scripted_tokens(&self) -> Vec<String> {
        let tokens = self.tokens.lock_ignore_poison();
        tokens.clone()
    }

    /// Snapshot of the scripted failure.
    fn scripted_failure(&self) -> Option<String> {
        let failure = self.failure.lock_ignore_poison();
        failure.clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record_prompt(prompt);
        if let Some(message) = self.scripted_failure() {
            return Err(Error::Provider(message));
        }
        Ok(self.scripted_tokens().concat())
    }

    async fn generate_stream(&self, prompt: &str) -> TokenStream {
        self.record_prompt(prompt);
        let tokens = self.scripted_tokens();
        let failure = self.scripted_failure();
        let streamed = Arc::clone(&self.streamed);
        let (sender, stream) = TokenStream::channel();

        tokio::spawn(async move {
            for token in tokens {
                if !sender.send(token).await {
                    return;
                }
                let mut delivered = streamed.lock_ignore_poison();
                *delivered += 1;
            }
            if let Some(message) = failure {
                sender.fail(Error::Provider(message)).await;
            }
        });

        stream
    }
}
