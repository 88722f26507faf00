//! Yahoo Finance Adapter - `MarketData` over the Public Chart/Search APIs
//!
//! Quotes and bars both come from the v8 chart endpoint: `meta` holds
//! the price statistics, `indicators.quote[0]` the OHLCV arrays.
//! Company search uses the v1 search endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use tracing::{debug, instrument, warn};

use super::types::{ChartEnvelope, ChartResult, SearchResponse};
use crate::adapters::http::{HttpClient, HttpClientConfig};
use crate::adapters::metrics::MetricsRegistry;
use crate::config::MarketDataConfig;
use crate::domain::{Bar, BarInterval, History, HistoryRange, Quote, Symbol, SymbolCandidate};
use crate::ports::{MarketData, ProviderError};

const PROVIDER: &str = "yahoo";

/// Yahoo Finance market-data client.
pub struct YahooFinance {
    http: HttpClient,
    chart_url: String,
    search_url: String,
    search_limit: String,
}

impl YahooFinance {
    /// Create a new Yahoo Finance client.
    pub fn new(config: &MarketDataConfig) -> Result<Self> {
        let http = HttpClient::new(HttpClientConfig {
            timeout: Duration::from_secs(config.timeout_seconds),
            max_concurrent: config.max_concurrent,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            user_agent: Some(config.user_agent.clone()),
            ..HttpClientConfig::new(PROVIDER)
        })?;

        Ok(Self {
            http,
            chart_url: config.chart_url.trim_end_matches('/').to_string(),
            search_url: config.search_url.trim_end_matches('/').to_string(),
            search_limit: config.search_limit.to_string(),
        })
    }

    /// Attach a metrics registry to the underlying HTTP client.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.http = self.http.with_metrics(metrics);
        self
    }

    /// Fetch the single chart result for a symbol.
    async fn chart(
        &self,
        symbol: &Symbol,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Result<ChartResult, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.chart_url, symbol);
        let query = [("range", range.as_str()), ("interval", interval.as_str())];

        let envelope: ChartEnvelope = match self.http.get_json(&url, &query).await {
            Ok(envelope) => envelope,
            Err(ProviderError::NotFound(_)) => return Err(ProviderError::NotFound(symbol.to_string())),
            Err(e) => return Err(e),
        };

        if let Some(error) = envelope.chart.error {
            if error.code.eq_ignore_ascii_case("Not Found") {
                return Err(ProviderError::NotFound(symbol.to_string()));
            }
            return Err(ProviderError::Upstream {
                provider: PROVIDER,
                status: 200,
                body: format!("{}: {}", error.code, error.description.unwrap_or_default()),
            });
        }

        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }
}

#[async_trait]
impl MarketData for YahooFinance {
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let result = self
            .chart(symbol, HistoryRange::OneDay, BarInterval::OneDay)
            .await?;
        let meta = result.meta;

        debug!(price = ?meta.regular_market_price, "Quote fetched");

        Ok(Quote {
            symbol: symbol.clone(),
            current_price: meta.regular_market_price,
            fifty_two_week_high: meta.fifty_two_week_high,
            fifty_two_week_low: meta.fifty_two_week_low,
            volume: meta.regular_market_volume.map(to_volume),
            currency: meta.currency,
            exchange: meta.full_exchange_name.or(meta.exchange_name),
        })
    }

    #[instrument(skip(self, symbol, range, interval), fields(symbol = %symbol, range = %range, interval = %interval))]
    async fn history(
        &self,
        symbol: &Symbol,
        range: HistoryRange,
        interval: BarInterval,
    ) -> Result<History, ProviderError> {
        let result = self.chart(symbol, range, interval).await?;
        let bars = bars_from_chart(&result)?;

        debug!(bars = bars.len(), "History fetched");

        Ok(History {
            symbol: symbol.clone(),
            interval,
            bars,
        })
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SymbolCandidate>, ProviderError> {
        let url = format!("{}/v1/finance/search", self.search_url);
        let params = [
            ("q", query),
            ("quotesCount", self.search_limit.as_str()),
            ("newsCount", "0"),
        ];

        let response: SearchResponse = match self.http.get_json(&url, &params).await {
            Ok(response) => response,
            Err(ProviderError::NotFound(_)) => return Err(ProviderError::NotFound(query.to_string())),
            Err(e) => return Err(e),
        };

        let candidates: Vec<SymbolCandidate> = response
            .quotes
            .into_iter()
            .filter_map(|q| {
                Some(SymbolCandidate {
                    symbol: q.symbol.filter(|s| !s.is_empty())?,
                    exchange: q.exchange_display.or(q.exchange),
                    name: q.long_name.or(q.short_name),
                    quote_type: q.quote_type,
                })
            })
            .collect();

        debug!(candidates = candidates.len(), "Search completed");
        Ok(candidates)
    }
}

/// Zip the chart's parallel arrays into bars in exchange-local time.
fn bars_from_chart(result: &ChartResult) -> Result<Vec<Bar>, ProviderError> {
    let offset = FixedOffset::east_opt(result.meta.gmtoffset).ok_or_else(|| ProviderError::Decode {
        provider: PROVIDER,
        message: format!("invalid gmtoffset {}", result.meta.gmtoffset),
    })?;

    let Some(quote) = result.indicators.quote.first() else {
        if !result.timestamp.is_empty() {
            warn!("Chart has timestamps but no quote indicators");
        }
        return Ok(Vec::new());
    };

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let time: DateTime<FixedOffset> = offset.timestamp_opt(ts, 0).single()?;
            Some(Bar {
                time,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                volume: at(&quote.volume, i).map(to_volume),
            })
        })
        .collect();

    Ok(bars)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_volume(value: f64) -> u64 {
    value.max(0.0) as u64
}
