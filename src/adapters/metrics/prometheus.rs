//! Prometheus Metrics Registry - Service Observability
//!
//! Registers the service's Prometheus metrics and renders them in the
//! text exposition format. Covers public API traffic, upstream provider
//! latency, cache effectiveness and LLM usage.

use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::warn;

use crate::ports::AnalysisMetrics;

/// Centralized Prometheus metrics for the service.
///
/// All metrics follow the naming convention `tradewhisper_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Public API requests by route and status.
    pub http_requests: IntCounterVec,
    /// Public API latency by route (seconds).
    pub http_latency: HistogramVec,
    /// Outbound provider calls by provider and outcome.
    pub upstream_requests: IntCounterVec,
    /// Outbound provider latency by provider (seconds).
    pub upstream_latency: HistogramVec,
    /// Cache lookups by cache name and result (hit/miss).
    pub cache_lookups: IntCounterVec,
    /// LLM tokens billed by direction (input/output).
    pub llm_tokens: IntCounterVec,
    /// Completed analyses by risk bucket.
    pub analyses: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new("tradewhisper_http_requests_total", "Public API requests"),
            &["route", "status"],
        )?;

        let http_latency = HistogramVec::new(
            HistogramOpts::new(
                "tradewhisper_http_request_duration_seconds",
                "Public API request latency in seconds",
            )
            .buckets(vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["route"],
        )?;

        let upstream_requests = IntCounterVec::new(
            Opts::new(
                "tradewhisper_upstream_requests_total",
                "Outbound provider requests by outcome",
            ),
            &["provider", "outcome"],
        )?;

        let upstream_latency = HistogramVec::new(
            HistogramOpts::new(
                "tradewhisper_upstream_duration_seconds",
                "Outbound provider latency in seconds, retries included",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["provider"],
        )?;

        let cache_lookups = IntCounterVec::new(
            Opts::new("tradewhisper_cache_lookups_total", "Market-data cache lookups"),
            &["cache", "result"],
        )?;

        let llm_tokens = IntCounterVec::new(
            Opts::new("tradewhisper_llm_tokens_total", "LLM tokens billed"),
            &["direction"],
        )?;

        let analyses = IntCounterVec::new(
            Opts::new(
                "tradewhisper_analyses_total",
                "Trade analyses completed, by risk level",
            ),
            &["risk_level"],
        )?;

        // Register all metrics
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_latency.clone()))?;
        registry.register(Box::new(upstream_requests.clone()))?;
        registry.register(Box::new(upstream_latency.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(llm_tokens.clone()))?;
        registry.register(Box::new(analyses.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_latency,
            upstream_requests,
            upstream_latency,
            cache_lookups,
            llm_tokens,
            analyses,
        })
    }

    /// Record one public API request.
    pub fn observe_request(&self, route: &str, status: u16, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
        self.http_latency
            .with_label_values(&[route])
            .observe(elapsed.as_secs_f64());
    }

    /// Record one outbound provider call (all retries together).
    pub fn observe_upstream(&self, provider: &str, outcome: &str, elapsed: Duration) {
        self.upstream_requests
            .with_label_values(&[provider, outcome])
            .inc();
        self.upstream_latency
            .with_label_values(&[provider])
            .observe(elapsed.as_secs_f64());
    }

    pub fn cache_hit(&self, cache: &str) {
        self.cache_lookups.with_label_values(&[cache, "hit"]).inc();
    }

    pub fn cache_miss(&self, cache: &str) {
        self.cache_lookups.with_label_values(&[cache, "miss"]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl AnalysisMetrics for MetricsRegistry {
    fn record_llm_tokens(&self, direction: &str, tokens: u32) {
        self.llm_tokens
            .with_label_values(&[direction])
            .inc_by(u64::from(tokens));
    }

    fn record_analysis(&self, outcome: &str) {
        self.analyses.with_label_values(&[outcome]).inc();
    }
}
