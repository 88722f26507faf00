//! Stock Service - Quote Statistics and Chart Series
//!
//! Thin orchestration over the `MarketData` port: fetches the quote or
//! bar history and shapes it into response material.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::ServiceError;
use crate::domain::{BarInterval, BreakoutHint, Candle, HistoryRange, PriceSeries, Quote, Symbol};
use crate::ports::MarketData;

/// Default look-back for the daily line chart.
pub const CHART_RANGE: HistoryRange = HistoryRange::SixMonths;
pub const CHART_INTERVAL: BarInterval = BarInterval::OneDay;

/// Default window for the intraday candlestick chart.
pub const CANDLE_RANGE: HistoryRange = HistoryRange::OneDay;
pub const CANDLE_INTERVAL: BarInterval = BarInterval::FiveMinutes;

/// Quote plus the derived breakout hint.
#[derive(Debug, Clone, PartialEq)]
pub struct StockInfo {
    pub quote: Quote,
    pub breakout: BreakoutHint,
}

/// Stock statistics and chart data.
pub struct StockService {
    market: Arc<dyn MarketData>,
    breakout_threshold: Decimal,
}

impl StockService {
    pub fn new(market: Arc<dyn MarketData>, breakout_threshold: Decimal) -> Self {
        Self {
            market,
            breakout_threshold,
        }
    }

    /// Current price statistics for `symbol`.
    ///
    /// A quote without a current price means the provider has no
    /// trading data for the symbol and is reported as
    /// [`ServiceError::NoMarketData`].
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    pub async fn stock_info(&self, symbol: &Symbol) -> Result<StockInfo, ServiceError> {
        let quote = self.market.quote(symbol).await?;
        if quote.current_price.is_none() {
            return Err(ServiceError::NoMarketData(symbol.to_string()));
        }

        let breakout = BreakoutHint::evaluate(&quote, self.breakout_threshold);
        debug!(breakout = %breakout, "Stock info assembled");

        Ok(StockInfo { quote, breakout })
    }

    /// Close-price series; defaults to six months of daily bars.
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    pub async fn chart_data(
        &self,
        symbol: &Symbol,
        range: Option<HistoryRange>,
        interval: Option<BarInterval>,
    ) -> Result<PriceSeries, ServiceError> {
        let history = self
            .market
            .history(
                symbol,
                range.unwrap_or(CHART_RANGE),
                interval.unwrap_or(CHART_INTERVAL),
            )
            .await?;
        Ok(PriceSeries::from_history(&history))
    }

    /// OHLCV candles; defaults to today's 5-minute bars.
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    pub async fn candles(
        &self,
        symbol: &Symbol,
        range: Option<HistoryRange>,
        interval: Option<BarInterval>,
    ) -> Result<(BarInterval, Vec<Candle>), ServiceError> {
        let history = self
            .market
            .history(
                symbol,
                range.unwrap_or(CANDLE_RANGE),
                interval.unwrap_or(CANDLE_INTERVAL),
            )
            .await?;
        Ok((history.interval, Candle::from_history(&history)))
    }
}
