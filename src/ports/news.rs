//! News Port - Headlines per Symbol

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::{NewsKind, Symbol};

/// Trait for news sources.
#[async_trait]
pub trait NewsProvider: Send + Sync + 'static {
    /// Headlines for `symbol`, newest first.
    async fn headlines(&self, symbol: &Symbol, kind: NewsKind)
        -> Result<Vec<String>, ProviderError>;
}
