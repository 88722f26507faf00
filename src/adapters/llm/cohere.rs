//! Cohere Chat Client - `LlmClient` Adapter
//!
//! Sends single-turn prompts to the Cohere Chat API. Requests pass a
//! client-side governor quota first, then the shared retrying
//! `HttpClient`. The API key comes from `COHERE_API_KEY`.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{debug, info, instrument, warn};

use super::types::{ChatRequest, ChatResponse};
use crate::adapters::http::{HttpClient, HttpClientConfig};
use crate::adapters::metrics::MetricsRegistry;
use crate::config::LlmConfig;
use crate::ports::{Completion, LlmClient, ProviderError};

/// Environment variable holding the Cohere API key.
pub const API_KEY_ENV: &str = "COHERE_API_KEY";

const PROVIDER: &str = "cohere";

/// Cohere Chat API client with rate limiting.
pub struct CohereClient {
    /// Shared retrying HTTP client.
    http: HttpClient,
    /// Bearer token.
    api_key: String,
    /// Chat endpoint URL.
    chat_url: String,
    /// Model and sampling settings.
    config: LlmConfig,
    /// Client-side request quota.
    rate_limiter: DefaultDirectRateLimiter,
    /// Longest wait for a quota slot.
    rate_limit_wait: Duration,
}

impl CohereClient {
    /// Create a client with an explicit API key.
    pub fn new(config: LlmConfig, api_key: String) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "{API_KEY_ENV} must not be empty");

        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| anyhow!("requests_per_minute must be > 0"))?;
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        let http = HttpClient::new(HttpClientConfig {
            timeout: Duration::from_secs(config.timeout_seconds),
            max_concurrent: config.max_concurrent,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(500),
            ..HttpClientConfig::new(PROVIDER)
        })?;

        let chat_url = format!("{}/v1/chat", config.base_url.trim_end_matches('/'));
        let rate_limit_wait = Duration::from_millis(config.rate_limit_wait_ms);

        info!(
            model = %config.model,
            rate_limit = config.requests_per_minute,
            "Cohere client initialized"
        );

        Ok(Self {
            http,
            api_key,
            chat_url,
            config,
            rate_limiter,
            rate_limit_wait,
        })
    }

    /// Create a client reading the key from `COHERE_API_KEY`.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).with_context(|| format!("{API_KEY_ENV} not set"))?;
        Self::new(config, api_key)
    }

    /// Attach a metrics registry to the underlying HTTP client.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.http = self.http.with_metrics(metrics);
        self
    }
}

#[async_trait]
impl LlmClient for CohereClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        // Bounded wait for a quota slot; an exhausted quota surfaces as `RateLimited`.
        if tokio::time::timeout(self.rate_limit_wait, self.rate_limiter.until_ready())
            .await
            .is_err()
        {
            warn!(
                wait_ms = self.config.rate_limit_wait_ms,
                "Client-side LLM quota exhausted"
            );
            return Err(ProviderError::RateLimited { provider: PROVIDER });
        }

        let request = ChatRequest {
            model: &self.config.model,
            message: prompt,
            temperature: self.config.temperature,
            max_tokens: Some(self.config.max_tokens),
        };

        let response: ChatResponse = self
            .http
            .post_json(&self.chat_url, &self.api_key, &request)
            .await?;

        debug!(
            generation_id = ?response.generation_id,
            finish_reason = ?response.finish_reason,
            chars = response.text.len(),
            "Cohere completion received"
        );

        Ok(Completion {
            input_tokens: response.input_tokens(),
            output_tokens: response.output_tokens(),
            text: response.text,
            model: self.config.model.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
