//! Provider HTTP Client - Retrying, Concurrency-bounded REST Client
//!
//! Wraps reqwest with timeouts, a concurrency semaphore, exponential
//! backoff on transient failures, and JSON decoding into typed bodies.
//! Each provider adapter owns one instance.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::ports::ProviderError;

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Upper bound on a single backoff sleep.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Configuration for a provider HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Provider label for logs, errors and metrics.
    pub provider: &'static str,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Maximum retries on transient errors.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub retry_base_delay: Duration,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(30),
            max_concurrent: 10,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

/// Rate-limited HTTP client for one upstream provider.
pub struct HttpClient {
    /// Underlying HTTP client.
    http: Client,
    /// Client configuration.
    config: HttpClientConfig,
    /// Concurrency limiter.
    semaphore: Arc<Semaphore>,
    /// Optional metrics sink.
    metrics: Option<Arc<MetricsRegistry>>,
}

impl HttpClient {
    /// Create a new provider client.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(5);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

        Ok(Self {
            http,
            config,
            semaphore,
            metrics: None,
        })
    }

    /// Attach a metrics registry for upstream latency/outcome tracking.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// GET `url` with query parameters and decode the JSON body.
    pub async fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(url).query(query);
        let response = self.execute(request).await?;
        self.decode(response).await
    }

    /// POST a JSON body with bearer auth and decode the JSON reply.
    pub async fn post_json<B, T>(&self, url: &str, bearer: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        let response = self.execute(request).await?;
        self.decode(response).await
    }

    /// Execute with retries and record the outcome.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let started = Instant::now();
        let result = self.execute_with_retry(request).await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "ok",
                Err(ProviderError::NotFound(_)) => "not_found",
                Err(ProviderError::RateLimited { .. }) => "rate_limited",
                Err(ProviderError::Timeout { .. }) => "timeout",
                Err(_) => "error",
            };
            metrics.observe_upstream(self.config.provider, outcome, started.elapsed());
        }

        result
    }

    /// Execute request with concurrency limiting and retries.
    ///
    /// 429, 5xx and transport errors are retried with exponential
    /// backoff; 404 maps to `NotFound` naming the provider (adapters
    /// replace it with the symbol or query); other 4xx fail immediately.
    async fn execute_with_retry(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let provider = self.config.provider;
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ProviderError::Transport {
                provider,
                message: e.to_string(),
            })?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.config.retry_base_delay, attempt);
                debug!(provider, attempt, delay_ms = delay.as_millis(), "Retrying request");
                sleep(delay).await;
            }

            let Some(req) = request.try_clone() else {
                return Err(ProviderError::Transport {
                    provider,
                    message: "request body cannot be retried".to_string(),
                });
            };

            match req.send().await {
                Ok(response) => match response.status() {
                    status if status.is_success() => return Ok(response),
                    StatusCode::NOT_FOUND => {
                        return Err(ProviderError::NotFound(format!("{provider} resource")));
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        warn!(provider, attempt, "Rate limited by provider, backing off");
                        last_error = Some(ProviderError::RateLimited { provider });
                    }
                    status if status.is_server_error() => {
                        warn!(provider, status = %status, attempt, "Server error, retrying");
                        last_error = Some(ProviderError::Upstream {
                            provider,
                            status: status.as_u16(),
                            body: truncated_body(response).await,
                        });
                    }
                    status => {
                        return Err(ProviderError::Upstream {
                            provider,
                            status: status.as_u16(),
                            body: truncated_body(response).await,
                        });
                    }
                },
                Err(e) if e.is_timeout() => {
                    warn!(provider, attempt, "Request timed out");
                    last_error = Some(ProviderError::Timeout { provider });
                }
                Err(e) => {
                    warn!(provider, error = %e, attempt, "Request failed");
                    last_error = Some(ProviderError::Transport {
                        provider,
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or(ProviderError::Transport {
            provider,
            message: "max retries exceeded".to_string(),
        }))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ProviderError> {
        let provider = self.config.provider;
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout { provider }
            } else {
                ProviderError::Transport {
                    provider,
                    message: e.to_string(),
                }
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
            provider,
            message: e.to_string(),
        })
    }
}

/// Sleep before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

/// Read an error body, capped so upstream HTML pages don't flood logs.
async fn truncated_body(response: Response) -> String {
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
