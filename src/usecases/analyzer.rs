//! Trade Analyzer - LLM Interpretation of Trade Ideas
//!
//! Renders the research-assistant prompt, sends it through the
//! `LlmClient` port and parses the reply into a `TradeAnalysis`.
//! Token usage and risk buckets are recorded when metrics are attached.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::ServiceError;
use crate::domain::analysis::{build_analysis_prompt, parse_analysis};
use crate::domain::{DomainError, TradeAnalysis, TradeIdea};
use crate::ports::{AnalysisMetrics, LlmClient};

/// Turns natural-language trade ideas into structured analyses.
pub struct TradeAnalyzer {
    /// LLM provider.
    llm: Arc<dyn LlmClient>,
    /// Idea length limit in characters.
    max_idea_chars: usize,
    /// Optional metrics sink.
    metrics: Option<Arc<dyn AnalysisMetrics>>,
}

impl TradeAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, max_idea_chars: usize) -> Self {
        Self {
            llm,
            max_idea_chars,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn AnalysisMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate raw user text against this analyzer's limits.
    pub fn parse_idea(&self, text: &str) -> Result<TradeIdea, DomainError> {
        TradeIdea::with_limit(text, self.max_idea_chars)
    }

    /// Analyze a validated trade idea.
    ///
    /// # Errors
    /// - [`ServiceError::Provider`] when the LLM call fails
    /// - [`ServiceError::Domain`] with `InvalidLlmOutput` when the reply
    ///   is not the requested JSON
    #[instrument(skip_all, fields(model = %self.llm.model(), idea_chars = idea.as_str().len()))]
    pub async fn analyze(&self, idea: &TradeIdea) -> Result<TradeAnalysis, ServiceError> {
        let prompt = build_analysis_prompt(idea);
        let completion = self.llm.complete(&prompt).await?;

        if let Some(metrics) = &self.metrics {
            if let Some(tokens) = completion.input_tokens {
                metrics.record_llm_tokens("input", tokens);
            }
            if let Some(tokens) = completion.output_tokens {
                metrics.record_llm_tokens("output", tokens);
            }
        }

        let analysis = match parse_analysis(&completion.text) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(raw_chars = completion.text.len(), "LLM reply is not valid analysis JSON");
                if let Some(metrics) = &self.metrics {
                    metrics.record_analysis("invalid");
                }
                return Err(e.into());
            }
        };

        let risk = analysis.risk();
        if let Some(metrics) = &self.metrics {
            metrics.record_analysis(risk.as_str());
        }

        info!(
            strategy = %analysis.strategy,
            risk = %risk,
            indicators = analysis.indicators_to_watch.len(),
            "Trade idea analyzed"
        );

        Ok(analysis)
    }
}
