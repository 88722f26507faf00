//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! service's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `TradeAnalyzer`: idea -> prompt -> LLM -> structured analysis
//! - `StockService`: quote statistics, breakout hint, chart series
//! - `SymbolResolver`: company name + country -> ticker
//! - `InsightService`: all of the above for one idea, concurrently

pub mod analyzer;
pub mod insight;
pub mod resolver;
pub mod stock;

use thiserror::Error;

use crate::domain::DomainError;
use crate::ports::ProviderError;

pub use analyzer::TradeAnalyzer;
pub use insight::{Insight, InsightOutcome, InsightService, InsightTarget};
pub use resolver::SymbolResolver;
pub use stock::{StockInfo, StockService};

/// Failure of a use case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Input or LLM output rejected by domain rules.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An upstream provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider knows the symbol but returned no usable price.
    #[error("no market data available for {0}")]
    NoMarketData(String),
}
