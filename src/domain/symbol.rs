//! Ticker symbols and company-name resolution.
//!
//! Yahoo-style tickers carry an exchange suffix outside the US
//! (`RELIANCE.NS`, `VOD.L`). Resolution picks the search candidate that
//! trades on the requested country's main exchange.

use std::fmt;

use serde::Serialize;

use super::DomainError;

/// Longest ticker accepted, suffix included.
const MAX_SYMBOL_LEN: usize = 15;

/// Country name to exchange suffix, in display order.
pub const MARKETS: &[(&str, &str)] = &[
    ("United States", ""),
    ("India", ".NS"),
    ("United Kingdom", ".L"),
    ("Germany", ".DE"),
    ("Japan", ".T"),
    ("Hong Kong", ".HK"),
    ("Canada", ".TO"),
    ("Australia", ".AX"),
    ("France", ".PA"),
    ("South Korea", ".KS"),
    ("Brazil", ".SA"),
    ("Taiwan", ".TW"),
    ("China", ".SS"),
];

/// Country used when a request does not name one.
pub const DEFAULT_COUNTRY: &str = "United States";

/// An upper-cased, validated ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Trim, upper-case and validate a ticker.
    ///
    /// Accepts `A-Z 0-9 . - ^ =` (indices like `^GSPC`, FX like `EURUSD=X`).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let symbol = raw.trim().to_ascii_uppercase();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_SYMBOL_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

        if valid {
            Ok(Self(symbol))
        } else {
            Err(DomainError::InvalidSymbol(raw.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Look up the exchange suffix for a country (case-insensitive).
pub fn market_suffix(country: &str) -> Result<&'static str, DomainError> {
    let wanted = country.trim();
    MARKETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, suffix)| *suffix)
        .ok_or_else(|| DomainError::UnknownCountry(wanted.to_string()))
}

/// One hit from a provider's symbol search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolCandidate {
    pub symbol: String,
    pub exchange: Option<String>,
    pub name: Option<String>,
    pub quote_type: Option<String>,
}

/// Which rule selected the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Suffix,
    Exchange,
}

/// Outcome of resolving a company name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolResolution {
    Resolved { symbol: Symbol, matched_by: MatchedBy },
    /// No rule matched; the caller should pick one of these.
    Ambiguous { suggestions: Vec<String> },
    NoCandidates,
}

/// Pick a symbol from search candidates for the given country.
///
/// Order of preference:
/// 1. first candidate carrying the country's suffix (for the empty US
///    suffix: first candidate without any `.` suffix)
/// 2. first candidate whose exchange name contains the country name
/// 3. all candidate symbols as suggestions
pub fn resolve_symbol(
    candidates: &[SymbolCandidate],
    country: &str,
) -> Result<SymbolResolution, DomainError> {
    let suffix = market_suffix(country)?;
    let country_lower = country.trim().to_ascii_lowercase();

    // Candidates that fail validation never win a rule.
    let valid: Vec<(&SymbolCandidate, Symbol)> = candidates
        .iter()
        .filter_map(|c| Symbol::parse(&c.symbol).ok().map(|s| (c, s)))
        .collect();

    let by_suffix = valid.iter().find(|(_, s)| {
        if suffix.is_empty() {
            !s.as_str().contains('.')
        } else {
            s.as_str().ends_with(suffix)
        }
    });
    if let Some((_, hit)) = by_suffix {
        return Ok(SymbolResolution::Resolved {
            symbol: hit.clone(),
            matched_by: MatchedBy::Suffix,
        });
    }

    let by_exchange = valid.iter().find(|(c, _)| {
        c.exchange
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().contains(&country_lower))
    });
    if let Some((_, hit)) = by_exchange {
        return Ok(SymbolResolution::Resolved {
            symbol: hit.clone(),
            matched_by: MatchedBy::Exchange,
        });
    }

    let suggestions: Vec<String> = candidates
        .iter()
        .filter(|c| !c.symbol.is_empty())
        .map(|c| c.symbol.clone())
        .collect();

    if suggestions.is_empty() {
        Ok(SymbolResolution::NoCandidates)
    } else {
        Ok(SymbolResolution::Ambiguous { suggestions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(symbol: &str, exchange: &str) -> SymbolCandidate {
        SymbolCandidate {
            symbol: symbol.to_string(),
            exchange: Some(exchange.to_string()),
            name: None,
            quote_type: Some("EQUITY".to_string()),
        }
    }

    #[test]
    fn test_symbol_is_uppercased() {
        assert_eq!(Symbol::parse(" aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Symbol::parse("tcs.ns").unwrap().as_str(), "TCS.NS");
        assert_eq!(Symbol::parse("^gspc").unwrap().as_str(), "^GSPC");
    }

    #[test]
    fn test_symbol_rejects_garbage() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("AAPL; DROP").is_err());
        assert!(Symbol::parse("ABCDEFGHIJKLMNOP").is_err());
    }

    #[test]
    fn test_market_suffix_lookup() {
        assert_eq!(market_suffix("india").unwrap(), ".NS");
        assert_eq!(market_suffix("United States").unwrap(), "");
        assert_eq!(
            market_suffix("Atlantis"),
            Err(DomainError::UnknownCountry("Atlantis".to_string()))
        );
    }

    #[test]
    fn test_resolve_prefers_suffix() {
        let candidates = vec![
            candidate("ADANIENT.BO", "BSE"),
            candidate("ADANIENT.NS", "NSI"),
        ];
        let resolution = resolve_symbol(&candidates, "India").unwrap();
        assert_eq!(
            resolution,
            SymbolResolution::Resolved {
                symbol: Symbol::parse("ADANIENT.NS").unwrap(),
                matched_by: MatchedBy::Suffix,
            }
        );
    }

    #[test]
    fn test_resolve_us_skips_foreign_listings() {
        let candidates = vec![candidate("AAPL.MX", "MEX"), candidate("AAPL", "NMS")];
        match resolve_symbol(&candidates, "United States").unwrap() {
            SymbolResolution::Resolved { symbol, matched_by } => {
                assert_eq!(symbol.as_str(), "AAPL");
                assert_eq!(matched_by, MatchedBy::Suffix);
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_falls_back_to_exchange() {
        let candidates = vec![candidate("7203.X", "Japan Exchange")];
        match resolve_symbol(&candidates, "Japan").unwrap() {
            SymbolResolution::Resolved { symbol, matched_by } => {
                assert_eq!(symbol.as_str(), "7203.X");
                assert_eq!(matched_by, MatchedBy::Exchange);
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_suggests_when_nothing_matches() {
        let candidates = vec![candidate("SAP.DE", "GER"), candidate("SAP", "NYQ")];
        assert_eq!(
            resolve_symbol(&candidates, "France").unwrap(),
            SymbolResolution::Ambiguous {
                suggestions: vec!["SAP.DE".to_string(), "SAP".to_string()]
            }
        );
        assert_eq!(
            resolve_symbol(&[], "France").unwrap(),
            SymbolResolution::NoCandidates
        );
    }

    #[test]
    fn test_resolve_skips_invalid_suffix_match() {
        let candidates = vec![
            candidate("ABCDEFGHIJKLMNOP.NS", "NSE"),
            candidate("M&M.NS", "NSE"),
            candidate("TCS.NS", "NSE"),
        ];
        assert_eq!(
            resolve_symbol(&candidates, "India").unwrap(),
            SymbolResolution::Resolved {
                symbol: Symbol::parse("TCS.NS").unwrap(),
                matched_by: MatchedBy::Suffix,
            }
        );
    }

    #[test]
    fn test_resolve_skips_invalid_exchange_match() {
        let candidates = vec![
            candidate("TOYOTA MOTOR", "Japan Exchange"),
            candidate("7203.X", "Japan Exchange"),
        ];
        match resolve_symbol(&candidates, "Japan").unwrap() {
            SymbolResolution::Resolved { symbol, matched_by } => {
                assert_eq!(symbol.as_str(), "7203.X");
                assert_eq!(matched_by, MatchedBy::Exchange);
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }
}
