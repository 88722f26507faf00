//! Market Data Cache - TTL Decorator over any `MarketData`
//!
//! Keeps quotes, bar history and search results in separate moka
//! caches so each can have its own TTL. Only successful lookups are
//! stored; errors always reach the caller and are retried next time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::CacheConfig;
use crate::domain::{BarInterval, History, HistoryRange, Quote, Symbol, SymbolCandidate};
use crate::ports::{MarketData, ProviderError};

type HistoryKey = (Symbol, HistoryRange, BarInterval);

/// Caching wrapper around a market-data provider.
pub struct CachedMarketData {
    inner: Arc<dyn MarketData>,
    quotes: Cache<Symbol, Quote>,
    history: Cache<HistoryKey, Arc<History>>,
    search: Cache<String, Arc<Vec<SymbolCandidate>>>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl CachedMarketData {
    /// Wrap `inner` using TTLs and capacity from `config`.
    pub fn new(inner: Arc<dyn MarketData>, config: &CacheConfig) -> Self {
        Self {
            inner,
            quotes: ttl_cache(config.max_entries, config.quote_ttl_seconds),
            history: ttl_cache(config.max_entries, config.history_ttl_seconds),
            search: ttl_cache(config.max_entries, config.search_ttl_seconds),
            metrics: None,
        }
    }

    /// Attach a metrics registry for hit/miss counters.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, cache: &str, hit: bool) {
        if let Some(metrics) = &self.metrics {
            if hit {
                metrics.cache_hit(cache);
            } else {
                metrics.cache_miss(cache);
            }
        }
    }
}

fn ttl_cache<K, V>(max_entries: u64, ttl_seconds: u64) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(max_entries)
        .time_to_live(Duration::from_secs(ttl_seconds))
        .build()
}

#[async_trait]
impl MarketData for CachedMarketData {
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        if let Some(quote) = self.quotes.get(symbol).await {
            self.record("quote", true);
            debug!("Quote cache hit");
            return Ok(quote);
        }
        self.record("quote", false);

        let quote = self.inner.quote(symbol).await?;
        self.quotes.insert(symbol.clone(), quote.clone()).await;
        Ok(quote)
    }

    #[instrument(skip(self, symbol, range, interval), fields(symbol = %symbol, range = %range, interval = %interval))]
    async fn history(
        &self,
        symbol: &Symbol,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Result<History, ProviderError> {
        let key = (symbol.clone(), range, interval);
        if let Some(history) = self.history.get(&key).await {
            self.record("history", true);
            debug!("History cache hit");
            return Ok(History::clone(&history));
        }
        self.record("history", false);

        let history = self.inner.history(symbol, range, interval).await?;
        self.history.insert(key, Arc::new(history.clone())).await;
        Ok(history)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SymbolCandidate>, ProviderError> {
        let key = query.trim().to_lowercase();
        if let Some(candidates) = self.search.get(&key).await {
            self.record("search", true);
            return Ok(Vec::clone(&candidates));
        }
        self.record("search", false);

        let candidates = self.inner.search(query).await?;
        self.search.insert(key, Arc::new(candidates.clone())).await;
        Ok(candidates)
    }
}
