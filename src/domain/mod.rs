//! Domain layer - Core business logic and models.
//!
//! Pure types and rules for trade-idea analysis: prompt rendering,
//! LLM output parsing, symbol validation and resolution, breakout
//! detection and chart series shaping. No I/O happens here
//! (hexagonal architecture inner ring).

pub mod analysis;
pub mod market;
pub mod news;
pub mod symbol;

use thiserror::Error;

// Re-export core types for convenience
pub use analysis::{RiskLevel, TradeAnalysis, TradeIdea};
pub use market::{
    Bar, BarInterval, BreakoutHint, Candle, History, HistoryRange, PriceSeries, Quote,
};
pub use news::NewsKind;
pub use symbol::{MatchedBy, Symbol, SymbolCandidate, SymbolResolution};

/// Validation and parsing failures raised by the domain layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Trade idea was empty after trimming.
    #[error("trade idea must not be empty")]
    EmptyIdea,

    /// Trade idea exceeded the configured character limit.
    #[error("trade idea is {len} characters, limit is {max}")]
    IdeaTooLong { len: usize, max: usize },

    /// Ticker symbol failed validation.
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    /// Company search query was empty.
    #[error("company name must not be empty")]
    EmptyCompany,

    /// Country is not in the market suffix table.
    #[error("unknown country or market '{0}'")]
    UnknownCountry(String),

    /// History range not accepted by the market-data provider.
    #[error("invalid range '{0}'")]
    InvalidRange(String),

    /// Bar interval not accepted by the market-data provider.
    #[error("invalid interval '{0}'")]
    InvalidInterval(String),

    /// News type other than `latest` / `impactful`.
    #[error("unknown news type '{0}', expected 'latest' or 'impactful'")]
    UnknownNewsKind(String),

    /// The LLM answered with something that is not the requested JSON.
    #[error("LLM response is not valid JSON")]
    InvalidLlmOutput { raw: String },
}
