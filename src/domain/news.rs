//! News categories and the canned headline set used until a real
//! news provider is wired in.

use std::str::FromStr;

use serde::Serialize;

use super::DomainError;
use super::symbol::Symbol;

/// Which slice of the news feed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsKind {
    #[default]
    Latest,
    Impactful,
}

impl NewsKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Impactful => "impactful",
        }
    }
}

impl FromStr for NewsKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "impactful" => Ok(Self::Impactful),
            _ => Err(DomainError::UnknownNewsKind(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for NewsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic demo headlines for a symbol.
pub fn simulated_headlines(symbol: &Symbol, kind: NewsKind) -> Vec<String> {
    match kind {
        NewsKind::Latest => vec![
            format!("{symbol} jumped 3.2% after strong earnings report."),
            format!("{symbol} trading volume increased significantly this week."),
        ],
        NewsKind::Impactful => vec![
            format!("{symbol} dropped 10% after executive resignation."),
            format!("{symbol} under SEC investigation over disclosures."),
        ],
    }
}
