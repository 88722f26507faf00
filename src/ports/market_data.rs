//! Market Data Port - Quotes, History and Symbol Search
//!
//! Implemented by the Yahoo Finance adapter and by the caching
//! decorator that wraps it.

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::{BarInterval, History, HistoryRange, Quote, Symbol, SymbolCandidate};

/// Trait for market-data providers.
#[async_trait]
pub trait MarketData: Send + Sync + 'static {
    /// Current price statistics for a symbol.
    ///
    /// # Errors
    /// [`ProviderError::NotFound`] for unknown symbols.
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError>;

    /// OHLCV bars over `range` at `interval` granularity.
    async fn history(
        &self,
        symbol: &Symbol,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Result<History, ProviderError>;

    /// Free-text symbol search (company names, partial tickers).
    async fn search(&self, query: &str) -> Result<Vec<SymbolCandidate>, ProviderError>;
}
