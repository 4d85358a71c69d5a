use async_trait::async_trait;

use crate::streaming::TokenStream;
use crate::Result;

/// Trait for LLM backends that synthesize answers from a filled prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the unique identifier for this generator.
    fn name(&self) -> &'static str;

    /// Generates the complete response text for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the request,
    /// or the response cannot be parsed.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generates a response as a stream of tokens in generation order.
    ///
    /// Transport failures surface as an `Err` item on the returned stream
    /// rather than through this method's return value, so callers observe
    /// tokens produced before the failure.
    async fn generate_stream(&self, prompt: &str) -> TokenStream;
}
