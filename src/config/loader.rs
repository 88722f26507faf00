//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, applying environment overrides,
//! validating all parameters, and providing clear error messages for
//! misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Overrides `service.bind_address`.
pub const ENV_BIND: &str = "TRADEWHISPER_BIND";
/// Overrides `service.log_level`.
pub const ENV_LOG_LEVEL: &str = "TRADEWHISPER_LOG";
/// Platform-assigned port (PaaS convention); used when `ENV_BIND` is unset.
pub const ENV_PORT: &str = "PORT";

/// Upper bound for `max_retries` in any provider section.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Load, override and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;

  info!(
    bind = %config.service.bind_address,
    llm_model = %config.llm.model,
    cache = config.cache.enabled,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse TOML text into an [`AppConfig`] (no overrides, no validation).
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
    config.service.bind_address = bind;
  } else if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
    config.service.bind_address = format!("0.0.0.0:{port}");
  }

  if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
    config.service.log_level = level;
  }
}

/// Validate all configuration parameters.
///
/// # Errors
/// Fails on empty URLs, unparsable bind addresses, zero quotas,
/// excessive retry counts and out-of-range thresholds.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Service validation
  config
    .service
    .bind_address
    .parse::<std::net::SocketAddr>()
    .with_context(|| format!("Invalid service.bind_address: {}", config.service.bind_address))?;

  // LLM validation
  anyhow::ensure!(!config.llm.base_url.is_empty(), "llm.base_url must not be empty");
  anyhow::ensure!(!config.llm.model.is_empty(), "llm.model must not be empty");
  anyhow::ensure!(
    (0.0..=5.0).contains(&config.llm.temperature),
    "llm.temperature must be in [0, 5], got {}",
    config.llm.temperature
  );
  anyhow::ensure!(
    config.llm.requests_per_minute > 0,
    "llm.requests_per_minute must be positive"
  );
  anyhow::ensure!(config.llm.max_concurrent > 0, "llm.max_concurrent must be positive");
  anyhow::ensure!(config.llm.timeout_seconds > 0, "llm.timeout_seconds must be positive");
  anyhow::ensure!(
    config.llm.max_retries <= MAX_RETRIES_LIMIT,
    "llm.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
    config.llm.max_retries
  );
  anyhow::ensure!(
    config.llm.rate_limit_wait_ms > 0,
    "llm.rate_limit_wait_ms must be positive"
  );

  // Market data validation
  anyhow::ensure!(
    !config.market_data.chart_url.is_empty(),
    "market_data.chart_url must not be empty"
  );
  anyhow::ensure!(
    !config.market_data.search_url.is_empty(),
    "market_data.search_url must not be empty"
  );
  anyhow::ensure!(
    config.market_data.max_concurrent > 0,
    "market_data.max_concurrent must be positive"
  );
  anyhow::ensure!(
    config.market_data.timeout_seconds > 0,
    "market_data.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.market_data.max_retries <= MAX_RETRIES_LIMIT,
    "market_data.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
    config.market_data.max_retries
  );

  // Analysis validation
  anyhow::ensure!(
    config.analysis.breakout_threshold > 0.0 && config.analysis.breakout_threshold <= 1.0,
    "analysis.breakout_threshold must be in (0, 1], got {}",
    config.analysis.breakout_threshold
  );
  anyhow::ensure!(
    config.analysis.max_idea_chars > 0,
    "analysis.max_idea_chars must be positive"
  );

  // Cache validation
  if config.cache.enabled {
    anyhow::ensure!(config.cache.max_entries > 0, "cache.max_entries must be positive");
  }

  // Metrics validation
  if config.metrics.enabled {
    config
      .metrics
      .bind_address
      .parse::<std::net::SocketAddr>()
      .with_context(|| format!("Invalid metrics.bind_address: {}", config.metrics.bind_address))?;
  }

  Ok(())
}
