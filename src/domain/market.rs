//! Market data domain types.
//!
//! Provider-neutral quote and bar types, plus the rules that turn them
//! into response material: the breakout hint, 2-decimal price rounding,
//! daily close series and intraday candles.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::DomainError;
use super::symbol::Symbol;

/// Default breakout threshold: within 2% of the 52-week high.
pub const DEFAULT_BREAKOUT_THRESHOLD: Decimal = dec!(0.98);

/// Snapshot of a symbol's price statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: Symbol,
    pub current_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<u64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

/// Whether the current price sits close enough to the 52-week high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakoutHint {
    NearBreakout,
    NotInBreakout,
    InsufficientData,
}

impl BreakoutHint {
    /// Compare the current price against `threshold * 52-week high`.
    ///
    /// Exactly at the threshold counts as near. Missing or non-finite
    /// inputs yield [`BreakoutHint::InsufficientData`].
    pub fn evaluate(quote: &Quote, threshold: Decimal) -> Self {
        let (Some(current), Some(high)) = (quote.current_price, quote.fifty_two_week_high) else {
            return Self::InsufficientData;
        };
        let (Some(current), Some(high)) = (Decimal::from_f64(current), Decimal::from_f64(high))
        else {
            return Self::InsufficientData;
        };

        if current >= high * threshold {
            Self::NearBreakout
        } else {
            Self::NotInBreakout
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NearBreakout => "Near breakout zone",
            Self::NotInBreakout => "Not in breakout zone",
            Self::InsufficientData => "Insufficient data",
        }
    }
}

impl std::fmt::Display for BreakoutHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round a price to 2 decimals, midpoint away from zero.
///
/// Returns `None` for NaN and infinities.
pub fn round_price(price: f64) -> Option<f64> {
    Decimal::from_f64(price)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

macro_rules! provider_token_enum {
    ($(#[$meta:meta])* $name:ident, $err:ident, { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($token => Ok(Self::$variant),)+
                    other => Err(DomainError::$err(other.to_string())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

provider_token_enum!(
    /// Look-back window accepted by the chart endpoint.
    HistoryRange, InvalidRange, {
        OneDay => "1d",
        FiveDays => "5d",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
        SixMonths => "6mo",
        OneYear => "1y",
        TwoYears => "2y",
        FiveYears => "5y",
        TenYears => "10y",
        YearToDate => "ytd",
        Max => "max",
    }
);

provider_token_enum!(
    /// Bar width accepted by the chart endpoint.
    BarInterval, InvalidInterval, {
        OneMinute => "1m",
        TwoMinutes => "2m",
        FiveMinutes => "5m",
        FifteenMinutes => "15m",
        ThirtyMinutes => "30m",
        SixtyMinutes => "60m",
        NinetyMinutes => "90m",
        OneHour => "1h",
        OneDay => "1d",
        FiveDays => "5d",
        OneWeek => "1wk",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
    }
);

/// One OHLCV bar, timestamped in the exchange's local offset.
///
/// Providers leave gaps as `None` (halts, partial sessions).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: DateTime<FixedOffset>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Bars for one symbol over one range/interval.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub symbol: Symbol,
    pub interval: BarInterval,
    pub bars: Vec<Bar>,
}

/// Close-price series for line charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub symbol: String,
    /// `YYYY-MM-DD` in the exchange's timezone.
    pub dates: Vec<String>,
    /// Closes rounded to 2 decimals, parallel to `dates`.
    pub prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from bars, skipping bars without a usable close.
    pub fn from_history(history: &History) -> Self {
        let (dates, prices): (Vec<String>, Vec<f64>) = history
            .bars
            .iter()
            .filter_map(|bar| {
                let close = round_price(bar.close?)?;
                Some((bar.time.format("%Y-%m-%d").to_string(), close))
            })
            .unzip();

        Self {
            symbol: history.symbol.to_string(),
            dates,
            prices,
        }
    }
}

/// Complete OHLCV candle for candlestick charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    /// RFC 3339 timestamp with exchange offset.
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// Convert a bar; `None` if any price is missing.
    ///
    /// A missing volume is reported as zero.
    pub fn from_bar(bar: &Bar) -> Option<Self> {
        Some(Self {
            time: bar.time.to_rfc3339(),
            open: round_price(bar.open?)?,
            high: round_price(bar.high?)?,
            low: round_price(bar.low?)?,
            close: round_price(bar.close?)?,
            volume: bar.volume.unwrap_or(0),
        })
    }

    pub fn from_history(history: &History) -> Vec<Self> {
        history.bars.iter().filter_map(Self::from_bar).collect()
    }
}
