//! Simulated News Feed - Canned Headlines for Demos and Tests

use async_trait::async_trait;

use crate::domain::news::simulated_headlines;
use crate::domain::{NewsKind, Symbol};
use crate::ports::{NewsProvider, ProviderError};

/// `NewsProvider` returning fixed, symbol-templated headlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedNews;

#[async_trait]
impl NewsProvider for SimulatedNews {
    async fn headlines(
        &self,
        symbol: &Symbol,
        kind: NewsKind,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(simulated_headlines(symbol, kind))
    }
}
