//! LLM Provider Adapters
//!
//! Sub-modules:
//! - `cohere`: Cohere Chat API client implementing `LlmClient`
//! - `types`: Cohere request/response definitions

pub mod cohere;
pub mod types;

pub use cohere::CohereClient;
