//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LlmClient`: text completion from a hosted language model
//! - `MarketData`: quotes, price history and symbol search
//! - `NewsProvider`: headlines for a symbol
//! - `AnalysisMetrics`: analysis outcome and token usage recording

pub mod llm;
pub mod market_data;
pub mod metrics;
pub mod news;

use thiserror::Error;

pub use llm::{Completion, LlmClient};
pub use market_data::MarketData;
pub use metrics::AnalysisMetrics;
pub use news::NewsProvider;

/// Failure talking to an external provider.
///
/// `provider` is a short static label ("cohere", "yahoo") used in logs
/// and metrics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The requested resource does not exist upstream.
    #[error("{0} not found")]
    NotFound(String),

    /// Upstream kept answering 429 after all retries.
    #[error("rate limited by {provider}")]
    RateLimited { provider: &'static str },

    /// Upstream answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Request exceeded the configured timeout.
    #[error("request to {provider} timed out")]
    Timeout { provider: &'static str },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("transport error talking to {provider}: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// Response body did not match the expected schema.
    #[error("failed to decode {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}
