//! Market Data Adapters
//!
//! Sub-modules:
//! - `yahoo`: Yahoo Finance chart/search client implementing `MarketData`
//! - `cache`: moka TTL decorator for any `MarketData`
//! - `types`: Yahoo response definitions

pub mod cache;
pub mod types;
pub mod yahoo;

pub use cache::CachedMarketData;
pub use yahoo::YahooFinance;
