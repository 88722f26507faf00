//! TradeWhisper — Entry Point
//!
//! Initializes configuration, logging and provider clients, then
//! serves the public API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load .env, config.toml + env overrides, validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create metrics registry and health state
//! 4. Create YahooFinance client (wrapped in a TTL cache when enabled)
//! 5. Create CohereClient (API key from COHERE_API_KEY)
//! 6. Build use cases and the router state
//! 7. Spawn the health/metrics server and the public API server
//! 8. Wait for SIGINT → readiness 503 → drain → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use tradewhisper::adapters::api::{ApiServer, AppState};
use tradewhisper::adapters::llm::CohereClient;
use tradewhisper::adapters::market::{CachedMarketData, YahooFinance};
use tradewhisper::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use tradewhisper::adapters::news::SimulatedNews;
use tradewhisper::config;
use tradewhisper::ports::{MarketData, NewsProvider};
use tradewhisper::usecases::{StockService, SymbolResolver, TradeAnalyzer};

/// Config path used when neither an argument nor the env var is given.
const DEFAULT_CONFIG_PATH: &str = "config.toml";
const ENV_CONFIG_PATH: &str = "TRADEWHISPER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::loader::load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        bind = %config.service.bind_address,
        model = %config.llm.model,
        cache = config.cache.enabled,
        "Starting TradeWhisper"
    );

    // ── 3. Metrics + health ─────────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);
    let health = Arc::new(HealthState::new());
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Market data (Yahoo Finance + optional cache) ─────
    let yahoo = YahooFinance::new(&config.market_data)
        .context("Failed to create Yahoo Finance client")?
        .with_metrics(Arc::clone(&metrics));
    let market: Arc<dyn MarketData> = if config.cache.enabled {
        Arc::new(
            CachedMarketData::new(Arc::new(yahoo), &config.cache).with_metrics(Arc::clone(&metrics)),
        )
    } else {
        Arc::new(yahoo)
    };

    // ── 5. LLM client ───────────────────────────────────────
    let llm = CohereClient::from_env(config.llm.clone())
        .context("Failed to create Cohere client")?
        .with_metrics(Arc::clone(&metrics));

    // ── 6. Use cases ────────────────────────────────────────
    let breakout_threshold = Decimal::try_from(config.analysis.breakout_threshold)
        .context("analysis.breakout_threshold is not representable as a decimal")?;

    let analyzer = Arc::new(
        TradeAnalyzer::new(Arc::new(llm), config.analysis.max_idea_chars)
            .with_metrics(metrics.clone()),
    );
    let stocks = Arc::new(StockService::new(Arc::clone(&market), breakout_threshold));
    let resolver = Arc::new(SymbolResolver::new(Arc::clone(&market)));
    let news: Arc<dyn NewsProvider> = Arc::new(SimulatedNews);

    let state = AppState::new(analyzer, stocks, resolver, news, Arc::clone(&metrics));

    // ── 7. Spawn servers ────────────────────────────────────
    let health_handle = if config.metrics.enabled {
        let server = HealthServer::new(
            Arc::clone(&health),
            Arc::clone(&metrics),
            config.metrics.bind_address.clone(),
        );
        let shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    let api = ApiServer::new(state, config.service.bind_address.clone());
    let api_shutdown = shutdown_tx.subscribe();
    let mut api_handle = tokio::spawn(api.run(api_shutdown));

    info!("All tasks spawned — service is running");

    // ── 8. Wait for SIGINT or an early server exit ──────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        result = &mut api_handle => {
            // The API server only returns on its own when it failed to bind or serve.
            health.mark_draining();
            let _ = shutdown_tx.send(());
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.context("API server failed")),
                Err(e) => Err(anyhow::Error::new(e).context("API server task panicked")),
            };
        }
    }

    // Readiness probe → 503 before the listener stops accepting.
    health.mark_draining();
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    let grace = Duration::from_secs(config.service.shutdown_grace_seconds);
    match tokio::time::timeout(grace, api_handle).await {
        Ok(Ok(Ok(()))) => info!("In-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "API server failed during shutdown"),
        Ok(Err(e)) => error!(error = %e, "API server task panicked"),
        Err(_) => warn!(grace_seconds = grace.as_secs(), "Drain timed out, exiting anyway"),
    }

    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
