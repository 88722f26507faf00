//! Route Handlers
//!
//! Each handler validates its input into domain types, calls one use
//! case and shapes the result. Extraction failures become 400s through
//! `ApiError`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::routes::AppState;
use super::types::{
    AnalyzeRequest, AnalyzeResponse, CandlesResponse, ChartQuery, InsightNews, InsightRequest,
    InsightResponse, MarketEntry, NewsQuery, NewsResponse, ResolveQuery, ResolveResponse, Section,
    StockInfoResponse, SymbolQuery,
};
use crate::domain::symbol::{DEFAULT_COUNTRY, MARKETS};
use crate::domain::{BarInterval, HistoryRange, NewsKind, PriceSeries, Symbol, SymbolResolution};
use crate::ports::ProviderError;
use crate::usecases::{InsightOutcome, InsightTarget};

type ApiResult<T> = Result<T, ApiError>;

/// Parse the optional range/interval pair of a chart query.
fn chart_window(query: &ChartQuery) -> ApiResult<(Option<HistoryRange>, Option<BarInterval>)> {
    let range = query.range.as_deref().map(str::parse::<HistoryRange>).transpose()?;
    let interval = query.interval.as_deref().map(str::parse::<BarInterval>).transpose()?;
    Ok((range, interval))
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    let idea = state.analyzer.parse_idea(&request.idea)?;
    let analysis = state.analyzer.analyze(&idea).await?;
    Ok(Json(AnalyzeResponse { analysis }))
}

/// `GET /stock_info?symbol=`
pub async fn stock_info(
    State(state): State<AppState>,
    query: Result<Query<SymbolQuery>, QueryRejection>,
) -> ApiResult<Json<StockInfoResponse>> {
    let Query(query) = query?;
    let symbol = Symbol::parse(&query.symbol)?;
    let info = state.stocks.stock_info(&symbol).await?;
    Ok(Json(info.into()))
}

/// `GET /chart_data?symbol=&range=&interval=`
pub async fn chart_data(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> ApiResult<Json<PriceSeries>> {
    let Query(query) = query?;
    let symbol = Symbol::parse(&query.symbol)?;
    let (range, interval) = chart_window(&query)?;
    let series = state.stocks.chart_data(&symbol, range, interval).await?;
    Ok(Json(series))
}

/// `GET /candles?symbol=&range=&interval=`
pub async fn candles(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> ApiResult<Json<CandlesResponse>> {
    let Query(query) = query?;
    let symbol = Symbol::parse(&query.symbol)?;
    let (range, interval) = chart_window(&query)?;
    let (interval, candles) = state.stocks.candles(&symbol, range, interval).await?;
    Ok(Json(CandlesResponse {
        symbol: symbol.to_string(),
        interval: interval.as_str(),
        candles,
    }))
}

/// `GET /news?symbol=&type=latest|impactful`
pub async fn news(
    State(state): State<AppState>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> ApiResult<Json<NewsResponse>> {
    let Query(query) = query?;
    let symbol = Symbol::parse(&query.symbol)?;
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<NewsKind>)
        .transpose()?
        .unwrap_or_default();
    let articles = state.news.headlines(&symbol, kind).await?;
    Ok(Json(NewsResponse {
        symbol: symbol.to_string(),
        kind,
        articles,
    }))
}

/// `GET /resolve_symbol?company=&country=`
pub async fn resolve_symbol(
    State(state): State<AppState>,
    query: Result<Query<ResolveQuery>, QueryRejection>,
) -> ApiResult<Json<ResolveResponse>> {
    let Query(query) = query?;
    let country = query.country.as_deref().unwrap_or(DEFAULT_COUNTRY);

    match state.resolver.resolve(&query.company, country).await? {
        SymbolResolution::Resolved { symbol, matched_by } => Ok(Json(ResolveResponse::Resolved {
            symbol: symbol.to_string(),
            matched_by,
        })),
        SymbolResolution::Ambiguous { suggestions } => {
            Ok(Json(ResolveResponse::Ambiguous { suggestions }))
        }
        SymbolResolution::NoCandidates => {
            Err(ProviderError::NotFound(query.company.trim().to_string()).into())
        }
    }
}

/// `GET /markets`
pub async fn markets() -> Json<Vec<MarketEntry>> {
    Json(
        MARKETS
            .iter()
            .map(|&(country, suffix)| MarketEntry { country, suffix })
            .collect(),
    )
}

/// `POST /insight`
pub async fn insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let idea = state.analyzer.parse_idea(&request.idea)?;

    let target = match (request.symbol.as_deref(), request.company) {
        (Some(symbol), _) => InsightTarget::Symbol(Symbol::parse(symbol)?),
        (None, Some(company)) => InsightTarget::Company {
            name: company,
            country: request.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        },
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either `symbol` or `company` is required".to_string(),
            ));
        }
    };

    let response = match state.insight.insight(&idea, target).await? {
        InsightOutcome::NeedsSelection { suggestions } => {
            Json(ResolveResponse::Ambiguous { suggestions }).into_response()
        }
        InsightOutcome::Ready(insight) => {
            let insight = *insight;
            Json(InsightResponse {
                symbol: insight.symbol.to_string(),
                matched_by: insight.matched_by,
                analysis: Section::from_result(insight.analysis),
                stock_info: Section::from_result(insight.stock),
                news: InsightNews {
                    latest: Section::from_result(insight.latest_news),
                    impactful: Section::from_result(insight.impactful_news),
                },
            })
            .into_response()
        }
    };

    Ok(response)
}
