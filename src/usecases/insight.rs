//! Insight Service - One-Shot Dashboard Flow
//!
//! Resolves the target symbol, then runs the LLM analysis, the quote
//! lookup and both news feeds concurrently. Each section succeeds or
//! fails on its own so a slow or failing provider never hides the
//! others.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::{ServiceError, StockInfo, StockService, SymbolResolver, TradeAnalyzer};
use crate::domain::{MatchedBy, NewsKind, Symbol, SymbolResolution, TradeAnalysis, TradeIdea};
use crate::ports::{NewsProvider, ProviderError};

/// What the insight is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightTarget {
    /// Caller already knows the ticker.
    Symbol(Symbol),
    /// Resolve a company name on a country's exchange.
    Company { name: String, country: String },
}

/// Per-section results for one trade idea.
#[derive(Debug, Clone)]
pub struct Insight {
    pub symbol: Symbol,
    /// Set when the symbol came from company resolution.
    pub matched_by: Option<MatchedBy>,
    pub analysis: Result<TradeAnalysis, ServiceError>,
    pub stock: Result<StockInfo, ServiceError>,
    pub latest_news: Result<Vec<String>, ServiceError>,
    pub impactful_news: Result<Vec<String>, ServiceError>,
}

impl Insight {
    /// Number of sections that failed.
    pub fn failed_sections(&self) -> usize {
        [
            self.analysis.is_err(),
            self.stock.is_err(),
            self.latest_news.is_err(),
            self.impactful_news.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

#[derive(Debug, Clone)]
pub enum InsightOutcome {
    Ready(Box<Insight>),
    /// The company matched several listings; the caller must pick one.
    NeedsSelection { suggestions: Vec<String> },
}

/// Combines analysis, stock statistics and news for one idea.
pub struct InsightService {
    analyzer: Arc<TradeAnalyzer>,
    stocks: Arc<StockService>,
    resolver: Arc<SymbolResolver>,
    news: Arc<dyn NewsProvider>,
}

impl InsightService {
    pub fn new(
        analyzer: Arc<TradeAnalyzer>,
        stocks: Arc<StockService>,
        resolver: Arc<SymbolResolver>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        Self {
            analyzer,
            stocks,
            resolver,
            news,
        }
    }

    /// Build an insight for `idea` about `target`.
    ///
    /// Only resolution failures fail the whole call; section failures
    /// are carried inside [`Insight`].
    #[instrument(skip_all)]
    pub async fn insight(
        &self,
        idea: &TradeIdea,
        target: InsightTarget,
    ) -> Result<InsightOutcome, ServiceError> {
        let (symbol, matched_by) = match target {
            InsightTarget::Symbol(symbol) => (symbol, None),
            InsightTarget::Company { name, country } => {
                match self.resolver.resolve(&name, &country).await? {
                    SymbolResolution::Resolved { symbol, matched_by } => (symbol, Some(matched_by)),
                    SymbolResolution::Ambiguous { suggestions } => {
                        return Ok(InsightOutcome::NeedsSelection { suggestions });
                    }
                    SymbolResolution::NoCandidates => {
                        return Err(ProviderError::NotFound(name).into());
                    }
                }
            }
        };

        let (analysis, stock, latest_news, impactful_news) = tokio::join!(
            self.analyzer.analyze(idea),
            self.stocks.stock_info(&symbol),
            self.headlines(&symbol, NewsKind::Latest),
            self.headlines(&symbol, NewsKind::Impactful),
        );

        let insight = Insight {
            symbol,
            matched_by,
            analysis,
            stock,
            latest_news,
            impactful_news,
        };

        let failed = insight.failed_sections();
        if failed > 0 {
            warn!(symbol = %insight.symbol, failed, "Insight assembled with failed sections");
        } else {
            info!(symbol = %insight.symbol, "Insight assembled");
        }

        Ok(InsightOutcome::Ready(Box::new(insight)))
    }

    async fn headlines(&self, symbol: &Symbol, kind: NewsKind) -> Result<Vec<String>, ServiceError> {
        Ok(self.news.headlines(symbol, kind).await?)
    }
}
