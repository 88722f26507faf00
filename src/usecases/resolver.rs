//! Symbol Resolver - Company Name to Ticker

use std::sync::Arc;

use tracing::{info, instrument};

use super::ServiceError;
use crate::domain::symbol::{market_suffix, resolve_symbol};
use crate::domain::{DomainError, SymbolResolution};
use crate::ports::MarketData;

/// Resolves company names through the provider's search.
pub struct SymbolResolver {
    market: Arc<dyn MarketData>,
}

impl SymbolResolver {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }

    /// Search for `company` and pick the listing for `country`.
    ///
    /// The country is validated before any upstream call.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        company: &str,
        country: &str,
    ) -> Result<SymbolResolution, ServiceError> {
        let company = company.trim();
        if company.is_empty() {
            return Err(DomainError::EmptyCompany.into());
        }
        market_suffix(country)?;

        let candidates = self.market.search(company).await?;
        let resolution = resolve_symbol(&candidates, country)?;

        match &resolution {
            SymbolResolution::Resolved { symbol, matched_by } => {
                info!(symbol = %symbol, ?matched_by, "Company resolved");
            }
            SymbolResolution::Ambiguous { suggestions } => {
                info!(suggestions = suggestions.len(), "Company is ambiguous");
            }
            SymbolResolution::NoCandidates => info!("No listing found"),
        }

        Ok(resolution)
    }
}
