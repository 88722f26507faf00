//! LLM Port - Text Completion Interface
//!
//! The use cases only need "prompt in, text out"; provider details
//! (auth, model names, rate limits) stay in the adapter.

use async_trait::async_trait;

use super::ProviderError;

/// A completion returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Raw completion text, possibly wrapped in a markdown fence.
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Prompt tokens billed, if reported.
    pub input_tokens: Option<u32>,
    /// Completion tokens billed, if reported.
    pub output_tokens: Option<u32>,
}

/// Trait for hosted LLM providers.
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    /// Send a single-turn prompt and return the completion.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] when the provider is unreachable,
    /// rejects the request, or answers with an unexpected body.
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}
