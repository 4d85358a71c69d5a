//! Generation adapters for external LLM services.

/// Scripted generator for tests.
pub mod mock;
/// `OpenRouter` generation adapter.
pub mod openrouter;
/// Server-sent event framing for streaming completions.
pub mod sse;

pub use mock::MockGenerator;
pub use openrouter::OpenRouterGenerator;
