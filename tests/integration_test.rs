//! Integration Tests - End-to-end API Testing
//!
//! Serves the real router on an ephemeral port with mockall mocks behind
//! the ports, then drives it over HTTP with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use mockall::mock;
use mockall::predicate::*;
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use tradewhisper::adapters::api::{AppState, router};
use tradewhisper::adapters::metrics::MetricsRegistry;
use tradewhisper::adapters::news::SimulatedNews;
use tradewhisper::domain::{
    Bar, BarInterval, History, HistoryRange, NewsKind, Quote, Symbol, SymbolCandidate,
};
use tradewhisper::ports::{Completion, LlmClient, MarketData, NewsProvider, ProviderError};
use tradewhisper::usecases::{StockService, SymbolResolver, TradeAnalyzer};

// ---- Mock Definitions ----

mock! {
    pub Market {}

    #[async_trait::async_trait]
    impl MarketData for Market {
        async fn quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError>;

        async fn history(
            &self,
            symbol: &Symbol,
            range: HistoryRange,
            interval: BarInterval,
        ) -> Result<History, ProviderError>;

        async fn search(&self, query: &str) -> Result<Vec<SymbolCandidate>, ProviderError>;
    }
}

mock! {
    pub News {}

    #[async_trait::async_trait]
    impl NewsProvider for News {
        async fn headlines(
            &self,
            symbol: &Symbol,
            kind: NewsKind,
        ) -> Result<Vec<String>, ProviderError>;
    }
}

/// LLM that always answers with the same text and counts calls.
struct ScriptedLlm {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion {
            text: self.reply.clone(),
            model: "scripted".to_string(),
            input_tokens: Some(120),
            output_tokens: Some(60),
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

const ANALYSIS_JSON: &str = r#"```json
{
  "strategy": "Momentum breakout",
  "risk_level": "Moderate",
  "indicators_to_watch": ["RSI", "50-day moving average", "Volume"],
  "summary": "Buy on confirmed breakout above resistance with a tight stop."
}
```"#;

// ---- Harness ----

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    llm_calls: Arc<AtomicUsize>,
}

impl TestApp {
    async fn spawn(reply: &str, market: MockMarket, news: Arc<dyn NewsProvider>) -> Self {
        let llm_calls = Arc::new(AtomicUsize::new(0));
        let llm = ScriptedLlm {
            reply: reply.to_string(),
            calls: Arc::clone(&llm_calls),
        };

        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let market: Arc<dyn MarketData> = Arc::new(market);
        let analyzer =
            Arc::new(TradeAnalyzer::new(Arc::new(llm), 2000).with_metrics(metrics.clone()));
        let stocks = Arc::new(StockService::new(Arc::clone(&market), dec!(0.98)));
        let resolver = Arc::new(SymbolResolver::new(market));
        let state = AppState::new(analyzer, stocks, resolver, news, metrics);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            llm_calls,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn apple_quote(symbol: &Symbol) -> Quote {
    Quote {
        symbol: symbol.clone(),
        current_price: Some(189.98),
        fifty_two_week_high: Some(199.62),
        fifty_two_week_low: Some(164.08),
        volume: Some(48_125_000),
        currency: Some("USD".to_string()),
        exchange: Some("NasdaqGS".to_string()),
    }
}

fn daily_history(symbol: &Symbol, interval: BarInterval) -> History {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let bar = |day: u32, close: f64| Bar {
        time: offset.with_ymd_and_hms(2024, 1, day, 9, 30, 0).unwrap(),
        open: Some(close - 1.0),
        high: Some(close + 1.0),
        low: Some(close - 2.0),
        close: Some(close),
        volume: Some(1_000_000),
    };
    History {
        symbol: symbol.clone(),
        interval,
        bars: vec![bar(2, 185.644), bar(3, 184.25)],
    }
}

fn candidate(symbol: &str, exchange: &str) -> SymbolCandidate {
    SymbolCandidate {
        symbol: symbol.to_string(),
        exchange: Some(exchange.to_string()),
        name: None,
        quote_type: Some("EQUITY".to_string()),
    }
}

fn simulated() -> Arc<dyn NewsProvider> {
    Arc::new(SimulatedNews)
}

// ---- /analyze ----

#[tokio::test]
async fn test_analyze_returns_structured_analysis() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let response = app
        .client
        .post(format!("{}/analyze", app.base_url))
        .json(&json!({"idea": "Buy AAPL if it breaks above 200 with volume"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["analysis"]["strategy"], "Momentum breakout");
    assert_eq!(body["analysis"]["risk_level"], "Moderate");
    assert_eq!(body["analysis"]["indicators_to_watch"].as_array().unwrap().len(), 3);
    assert_eq!(app.llm_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_analyze_invalid_llm_json_is_bad_gateway() {
    let app = TestApp::spawn("Here is my analysis: buy low, sell high.", MockMarket::new(), simulated()).await;

    let (status, body) = app.post("/analyze", json!({"idea": "Short TSLA"})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "LLM response is not valid JSON");
    assert_eq!(body["raw_output"], "Here is my analysis: buy low, sell high.");
}

#[tokio::test]
async fn test_analyze_rejects_blank_idea_without_llm_call() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.post("/analyze", json!({"idea": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
    assert_eq!(app.llm_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_rejects_malformed_body() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.post("/analyze", json!({"text": "Buy AAPL"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ---- /stock_info ----

#[tokio::test]
async fn test_stock_info_reports_breakout_hint() {
    let mut market = MockMarket::new();
    market
        .expect_quote()
        .withf(|symbol: &Symbol| symbol.as_str() == "AAPL")
        .times(1)
        .returning(|symbol| Ok(apple_quote(symbol)));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/stock_info?symbol=aapl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["current_price"], 189.98);
    assert_eq!(body["52_week_high"], 199.62);
    assert_eq!(body["52_week_low"], 164.08);
    assert_eq!(body["volume"], 48_125_000);
    assert_eq!(body["breakout_hint"], "Not in breakout zone");
}

#[tokio::test]
async fn test_stock_info_unknown_symbol_is_not_found() {
    let mut market = MockMarket::new();
    market
        .expect_quote()
        .returning(|symbol| Err(ProviderError::NotFound(symbol.to_string())));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/stock_info?symbol=ZZZZZZ").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ZZZZZZ not found");
}

#[tokio::test]
async fn test_stock_info_upstream_timeout() {
    let mut market = MockMarket::new();
    market
        .expect_quote()
        .returning(|_| Err(ProviderError::Timeout { provider: "yahoo" }));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, _) = app.get("/stock_info?symbol=MSFT").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_stock_info_upstream_rate_limit_is_too_many_requests() {
    let mut market = MockMarket::new();
    market
        .expect_quote()
        .returning(|_| Err(ProviderError::RateLimited { provider: "yahoo" }));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/stock_info?symbol=MSFT").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate limited by yahoo");
}

#[tokio::test]
async fn test_stock_info_invalid_symbol_skips_provider() {
    let mut market = MockMarket::new();
    market.expect_quote().times(0);
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, _) = app.get("/stock_info?symbol=AA%3BPL").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/stock_info").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---- /chart_data and /candles ----

#[tokio::test]
async fn test_chart_data_passes_range_and_rounds_prices() {
    let mut market = MockMarket::new();
    market
        .expect_history()
        .with(always(), eq(HistoryRange::OneYear), eq(BarInterval::OneDay))
        .times(1)
        .returning(|symbol, _, interval| Ok(daily_history(symbol, interval)));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/chart_data?symbol=AAPL&range=1y").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({
        "symbol": "AAPL",
        "dates": ["2024-01-02", "2024-01-03"],
        "prices": [185.64, 184.25],
    }));
}

#[tokio::test]
async fn test_chart_data_rejects_unknown_range() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.get("/chart_data?symbol=AAPL&range=7mo").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("7mo"));
}

#[tokio::test]
async fn test_candles_default_to_intraday_five_minute() {
    let mut market = MockMarket::new();
    market
        .expect_history()
        .with(always(), eq(HistoryRange::OneDay), eq(BarInterval::FiveMinutes))
        .times(1)
        .returning(|symbol, _, interval| Ok(daily_history(symbol, interval)));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/candles?symbol=AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interval"], "5m");
    let candles = body["candles"].as_array().unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0]["time"], "2024-01-02T09:30:00-05:00");
    assert_eq!(candles[0]["close"], 185.64);
}

// ---- /news ----

#[tokio::test]
async fn test_news_defaults_to_latest() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.get("/news?symbol=nvda").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "latest");
    assert_eq!(body["articles"][0], "NVDA jumped 3.2% after strong earnings report.");
}

#[tokio::test]
async fn test_news_impactful_and_unknown_kind() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.get("/news?symbol=NVDA&type=impactful").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"][1], "NVDA under SEC investigation over disclosures.");

    let (status, _) = app.get("/news?symbol=NVDA&type=rumors").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---- /resolve_symbol and /markets ----

#[tokio::test]
async fn test_resolve_symbol_by_suffix() {
    let mut market = MockMarket::new();
    market
        .expect_search()
        .withf(|query: &str| query == "Reliance")
        .returning(|_| {
            Ok(vec![
                candidate("RELIANCE.BO", "BSE"),
                candidate("RELIANCE.NS", "NSE"),
            ])
        });
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/resolve_symbol?company=Reliance&country=India").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"symbol": "RELIANCE.NS", "matched_by": "suffix"}));
}

#[tokio::test]
async fn test_resolve_symbol_ambiguous_and_unknown_country() {
    let mut market = MockMarket::new();
    market
        .expect_search()
        .times(1)
        .returning(|_| Ok(vec![candidate("7203.T", "Tokyo"), candidate("TM", "NYSE")]));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app.get("/resolve_symbol?company=Toyota&country=Brazil").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": ["7203.T", "TM"]}));

    let (status, _) = app.get("/resolve_symbol?company=Toyota&country=Atlantis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_markets_lists_all_countries() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.get("/markets").await;

    assert_eq!(status, StatusCode::OK);
    let markets = body.as_array().unwrap();
    assert_eq!(markets.len(), 13);
    assert_eq!(markets[0], json!({"country": "United States", "suffix": ""}));
    assert!(markets.contains(&json!({"country": "India", "suffix": ".NS"})));
}

// ---- /insight ----

#[tokio::test]
async fn test_insight_keeps_sections_independent() {
    let mut market = MockMarket::new();
    market
        .expect_search()
        .returning(|_| Ok(vec![candidate("SAP", "NYSE"), candidate("SAP.DE", "XETRA")]));
    market
        .expect_quote()
        .withf(|symbol: &Symbol| symbol.as_str() == "SAP.DE")
        .returning(|symbol| {
            Ok(Quote {
                current_price: Some(180.0),
                fifty_two_week_high: Some(182.0),
                ..apple_quote(symbol)
            })
        });

    let mut news = MockNews::new();
    news.expect_headlines()
        .with(always(), eq(NewsKind::Latest))
        .returning(|symbol, _| Ok(vec![format!("{symbol} opens higher")]));
    news.expect_headlines()
        .with(always(), eq(NewsKind::Impactful))
        .returning(|_, _| Err(ProviderError::Timeout { provider: "news" }));

    let app = TestApp::spawn(ANALYSIS_JSON, market, Arc::new(news)).await;

    let (status, body) = app
        .post("/insight", json!({"idea": "Buy SAP on cloud growth", "company": "SAP", "country": "Germany"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "SAP.DE");
    assert_eq!(body["matched_by"], "suffix");
    assert_eq!(body["analysis"]["data"]["strategy"], "Momentum breakout");
    assert_eq!(body["stock_info"]["data"]["breakout_hint"], "Near breakout zone");
    assert_eq!(body["news"]["latest"]["data"][0], "SAP.DE opens higher");
    assert_eq!(body["news"]["impactful"]["error"], "request to news timed out");
    assert!(body["news"]["impactful"].get("data").is_none());
}

#[tokio::test]
async fn test_insight_with_symbol_skips_resolution() {
    let mut market = MockMarket::new();
    market.expect_search().times(0);
    market
        .expect_quote()
        .returning(|symbol| Err(ProviderError::NotFound(symbol.to_string())));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app
        .post("/insight", json!({"idea": "Long MSFT into earnings", "symbol": "msft"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "MSFT");
    assert!(body.get("matched_by").is_none());
    assert_eq!(body["stock_info"]["error"], "MSFT not found");
    assert_eq!(body["news"]["latest"]["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_insight_ambiguous_company_returns_suggestions() {
    let mut market = MockMarket::new();
    market
        .expect_search()
        .returning(|_| Ok(vec![candidate("SONY", "NYSE")]));
    let app = TestApp::spawn(ANALYSIS_JSON, market, simulated()).await;

    let (status, body) = app
        .post("/insight", json!({"idea": "Buy Sony", "company": "Sony", "country": "Japan"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggestions": ["SONY"]}));
    assert_eq!(app.llm_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_insight_keeps_raw_llm_output_on_parse_failure() {
    let mut market = MockMarket::new();
    market.expect_quote().returning(|symbol| Ok(apple_quote(symbol)));
    let app = TestApp::spawn("Buy the dip, obviously.", market, simulated()).await;

    let (status, body) = app
        .post("/insight", json!({"idea": "Buy AAPL on the dip", "symbol": "AAPL"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["error"], "LLM response is not valid JSON");
    assert_eq!(body["analysis"]["raw_output"], "Buy the dip, obviously.");
    assert_eq!(body["stock_info"]["data"]["symbol"], "AAPL");
}

#[tokio::test]
async fn test_insight_requires_a_target() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let (status, body) = app.post("/insight", json!({"idea": "Buy something"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "either `symbol` or `company` is required");
}

// ---- Cross-cutting ----

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;

    let response = app
        .client
        .get(format!("{}/markets", app.base_url))
        .header("x-request-id", "trace-abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_oversized_request_id_is_replaced() {
    let app = TestApp::spawn(ANALYSIS_JSON, MockMarket::new(), simulated()).await;
    let oversized = "r".repeat(65);

    let response = app
        .client
        .get(format!("{}/markets", app.base_url))
        .header("x-request-id", oversized.as_str())
        .send()
        .await
        .unwrap();

    let echoed = response.headers()["x-request-id"].to_str().unwrap();
    assert_ne!(echoed, oversized);
    assert!(uuid::Uuid::parse_str(echoed).is_ok());
}
