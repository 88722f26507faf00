//! Metrics Port - Analysis Usage Recording

/// Sink for analysis outcomes and LLM token usage.
pub trait AnalysisMetrics: Send + Sync + 'static {
    /// Tokens billed for one completion; `direction` is `input` or `output`.
    fn record_llm_tokens(&self, direction: &str, tokens: u32);

    /// One finished analysis, labelled by risk bucket or `invalid`.
    fn record_analysis(&self, outcome: &str);
}
