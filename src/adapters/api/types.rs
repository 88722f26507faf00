//! Public API Request/Response Types
//!
//! Wire shapes of the HTTP API. Field names follow the published
//! contract (`52_week_high`, `type`) rather than Rust naming.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, DomainError, MatchedBy, NewsKind, TradeAnalysis};
use crate::usecases::{ServiceError, StockInfo};

// ─── Requests ───

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub idea: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolQuery {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuery {
    pub symbol: String,
    pub range: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsQuery {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveQuery {
    pub company: String,
    pub country: Option<String>,
}

/// Either `symbol` or `company` must be present; `symbol` wins.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightRequest {
    pub idea: String,
    pub symbol: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
}

// ─── Responses ───

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: TradeAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockInfoResponse {
    pub symbol: String,
    pub current_price: Option<f64>,
    #[serde(rename = "52_week_high")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "52_week_low")]
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    pub breakout_hint: &'static str,
}

impl From<StockInfo> for StockInfoResponse {
    fn from(info: StockInfo) -> Self {
        let quote = info.quote;
        Self {
            symbol: quote.symbol.to_string(),
            current_price: quote.current_price,
            fifty_two_week_high: quote.fifty_two_week_high,
            fifty_two_week_low: quote.fifty_two_week_low,
            volume: quote.volume,
            currency: quote.currency,
            exchange: quote.exchange,
            breakout_hint: info.breakout.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandlesResponse {
    pub symbol: String,
    pub interval: &'static str,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsResponse {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: NewsKind,
    pub articles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Resolved { symbol: String, matched_by: MatchedBy },
    Ambiguous { suggestions: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketEntry {
    pub country: &'static str,
    pub suffix: &'static str,
}

/// One independently computed part of an insight.
#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unparsed LLM text when the analysis section failed on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl<T> Section<T> {
    pub fn from_result<U>(result: Result<U, ServiceError>) -> Self
    where
        T: From<U>,
    {
        match result {
            Ok(value) => Self {
                data: Some(T::from(value)),
                error: None,
                raw_output: None,
            },
            Err(e) => {
                let raw_output = match &e {
                    ServiceError::Domain(DomainError::InvalidLlmOutput { raw }) => Some(raw.clone()),
                    _ => None,
                };
                Self {
                    data: None,
                    error: Some(e.to_string()),
                    raw_output,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightNews {
    pub latest: Section<Vec<String>>,
    pub impactful: Section<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightResponse {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchedBy>,
    pub analysis: Section<TradeAnalysis>,
    pub stock_info: Section<StockInfoResponse>,
    pub news: InsightNews,
}

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}
