//! Public API Server - Router, Request Tracking and Lifecycle
//!
//! Serves the trade-idea API via axum 0.7. Every request gets an
//! `x-request-id` (caller-supplied or a fresh UUID v4), a tracing span
//! and a latency/status observation keyed by the matched route.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tokio::sync::broadcast;
use tracing::{Instrument, info, info_span, instrument};
use uuid::Uuid;

use super::handlers;
use crate::adapters::metrics::MetricsRegistry;
use crate::ports::NewsProvider;
use crate::usecases::{InsightService, StockService, SymbolResolver, TradeAnalyzer};

/// Response header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Shared handler state. Cloned per request; everything inside is `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<TradeAnalyzer>,
    pub stocks: Arc<StockService>,
    pub resolver: Arc<SymbolResolver>,
    pub news: Arc<dyn NewsProvider>,
    pub insight: Arc<InsightService>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// Assemble state; the insight service shares the other use cases.
    pub fn new(
        analyzer: Arc<TradeAnalyzer>,
        stocks: Arc<StockService>,
        resolver: Arc<SymbolResolver>,
        news: Arc<dyn NewsProvider>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let insight = Arc::new(InsightService::new(
            Arc::clone(&analyzer),
            Arc::clone(&stocks),
            Arc::clone(&resolver),
            Arc::clone(&news),
        ));
        Self {
            analyzer,
            stocks,
            resolver,
            news,
            insight,
            metrics,
        }
    }
}

/// Build the public router.
pub fn router(state: AppState) -> Router {
    let metrics = Arc::clone(&state.metrics);

    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/stock_info", get(handlers::stock_info))
        .route("/chart_data", get(handlers::chart_data))
        .route("/candles", get(handlers::candles))
        .route("/news", get(handlers::news))
        .route("/resolve_symbol", get(handlers::resolve_symbol))
        .route("/markets", get(handlers::markets))
        .route("/insight", post(handlers::insight))
        .layer(middleware::from_fn_with_state(metrics, track_request))
        .with_state(state)
}

/// Tag, trace and measure one request.
async fn track_request(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str)
        .to_string();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        route = %route,
    );

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = started.elapsed();
    let status = response.status().as_u16();

    metrics.observe_request(&route, status, elapsed);
    span.in_scope(|| {
        info!(
            status,
            latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Public API server.
pub struct ApiServer {
    state: AppState,
    bind_address: String,
}

impl ApiServer {
    pub fn new(state: AppState, bind_address: String) -> Self {
        Self {
            state,
            bind_address,
        }
    }

    /// Serve until the shutdown signal fires, then drain in-flight requests.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = router(self.state);
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!(address = %self.bind_address, "API server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }
}
