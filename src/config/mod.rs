//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides (see `loader`). Provider URLs,
//! timeouts and cache TTLs live here; secrets never do - the LLM
//! API key is read from `COHERE_API_KEY`.

pub mod loader;

use serde::Deserialize;

/// Top-level service configuration.
///
/// Every section has defaults, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Service identity and HTTP binding.
  pub service: ServiceConfig,
  /// LLM provider settings.
  pub llm: LlmConfig,
  /// Market-data provider settings.
  pub market_data: MarketDataConfig,
  /// Analysis tuning.
  pub analysis: AnalysisConfig,
  /// Market-data caching.
  pub cache: CacheConfig,
  /// Metrics and health endpoints.
  pub metrics: MetricsConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Public API bind address.
  pub bind_address: String,
  /// Seconds to wait for in-flight requests on shutdown.
  pub shutdown_grace_seconds: u64,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      name: "tradewhisper".to_string(),
      log_level: "info".to_string(),
      bind_address: "0.0.0.0:8000".to_string(),
      shutdown_grace_seconds: 10,
    }
  }
}

/// LLM (Cohere Chat API) configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// API base URL.
  pub base_url: String,
  /// Chat model identifier.
  pub model: String,
  /// Sampling temperature.
  pub temperature: f32,
  /// Completion token cap.
  pub max_tokens: u32,
  /// Client-side request quota.
  pub requests_per_minute: u32,
  /// Longest wait for a quota slot before failing as rate limited.
  pub rate_limit_wait_ms: u64,
  /// Per-request timeout in seconds.
  pub timeout_seconds: u64,
  /// Retries on 429/5xx/transport errors.
  pub max_retries: u32,
  /// Concurrent in-flight requests.
  pub max_concurrent: usize,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.cohere.ai".to_string(),
      model: "command-r-plus-04-2024".to_string(),
      temperature: 0.6,
      max_tokens: 800,
      requests_per_minute: 20,
      rate_limit_wait_ms: 10_000,
      timeout_seconds: 60,
      max_retries: 2,
      max_concurrent: 4,
    }
  }
}

/// Market-data (Yahoo Finance) configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
  /// Chart API host (quotes and history).
  pub chart_url: String,
  /// Search API host.
  pub search_url: String,
  /// User-Agent header; Yahoo rejects library defaults.
  pub user_agent: String,
  /// Per-request timeout in seconds.
  pub timeout_seconds: u64,
  /// Retries on 429/5xx/transport errors.
  pub max_retries: u32,
  /// Base backoff delay in milliseconds.
  pub retry_base_delay_ms: u64,
  /// Concurrent in-flight requests.
  pub max_concurrent: usize,
  /// Maximum search candidates requested.
  pub search_limit: u32,
}

impl Default for MarketDataConfig {
  fn default() -> Self {
    Self {
      chart_url: "https://query1.finance.yahoo.com".to_string(),
      search_url: "https://query2.finance.yahoo.com".to_string(),
      user_agent: "Mozilla/5.0".to_string(),
      timeout_seconds: 10,
      max_retries: 3,
      retry_base_delay_ms: 200,
      max_concurrent: 16,
      search_limit: 10,
    }
  }
}

/// Analysis tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
  /// Fraction of the 52-week high that counts as "near breakout".
  pub breakout_threshold: f64,
  /// Maximum trade idea length in characters.
  pub max_idea_chars: usize,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      breakout_threshold: 0.98,
      max_idea_chars: 2000,
    }
  }
}

/// Market-data cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Wrap the market-data adapter in a TTL cache.
  pub enabled: bool,
  /// Quote TTL (seconds).
  pub quote_ttl_seconds: u64,
  /// History TTL (seconds).
  pub history_ttl_seconds: u64,
  /// Search TTL (seconds).
  pub search_ttl_seconds: u64,
  /// Maximum entries per cache.
  pub max_entries: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      quote_ttl_seconds: 60,
      history_ttl_seconds: 300,
      search_ttl_seconds: 3600,
      max_entries: 10_000,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Serve /live, /ready and /metrics.
  pub enabled: bool,
  /// Metrics server bind address.
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: "0.0.0.0:9090".to_string(),
    }
  }
}
