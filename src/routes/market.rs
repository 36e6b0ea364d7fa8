use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    IndicatorSnapshot, NewsItem, PriceBar, Quote, Recommendation, SentimentSnapshot,
};
use crate::services::market_data;
use crate::state::AppState;

// ==============================================================================
// Router
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol/prices", get(get_prices))
        .route("/:symbol/indicators/latest", get(get_latest_indicators))
        .route("/:symbol/sentiment/latest", get(get_latest_sentiment))
        .route("/:symbol/recommendation/latest", get(get_latest_recommendation))
        .route("/:symbol/quote", get(get_quote))
        .route("/:symbol/news", get(get_news))
}

// ==============================================================================
// Query params
// ==============================================================================

#[derive(Debug, Deserialize)]
struct DaysParam {
    days: Option<i64>,
}

/// `chrono::Duration::days` panics on huge magnitudes, so the lookback
/// parameter is bounded before any date arithmetic. Ten years covers
/// every stored series.
const MAX_LOOKBACK_DAYS: i64 = 3650;

fn validate_days(days: i64) -> Result<i64, AppError> {
    if !(0..=MAX_LOOKBACK_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 0 and {MAX_LOOKBACK_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

fn normalize_symbol(symbol: &str) -> Result<String, AppError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || symbol.len() > 10 || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::Validation(format!("invalid symbol: {symbol:?}")));
    }
    Ok(symbol)
}

// ==============================================================================
// Handlers
// ==============================================================================

/// GET /api/stocks/:symbol/prices?days=N
async fn get_prices(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<DaysParam>,
) -> Result<Json<Vec<PriceBar>>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/prices", symbol);

    let mut bars = state.store.fetch_price_history(&symbol).await?;
    if let Some(days) = params.days {
        let days = validate_days(days)?;
        let cutoff = Utc::now().date_naive() - Duration::days(days);
        bars.retain(|b| b.date >= cutoff);
    }

    if bars.is_empty() {
        return Err(AppError::NotFound(format!("no price data for {symbol}")));
    }
    Ok(Json(bars))
}

/// GET /api/stocks/:symbol/indicators/latest
async fn get_latest_indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<IndicatorSnapshot>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/indicators/latest", symbol);

    state
        .store
        .latest_indicators(&symbol)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no indicators for {symbol}")))
}

/// GET /api/stocks/:symbol/sentiment/latest
async fn get_latest_sentiment(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SentimentSnapshot>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/sentiment/latest", symbol);

    state
        .store
        .latest_sentiment(&symbol)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no sentiment data for {symbol}")))
}

/// GET /api/stocks/:symbol/recommendation/latest
async fn get_latest_recommendation(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Recommendation>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/recommendation/latest", symbol);

    state
        .store
        .latest_recommendation(&symbol)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no recommendation for {symbol}")))
}

/// GET /api/stocks/:symbol/quote
async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/quote", symbol);

    let quote = market_data::get_quote(
        state.store.as_ref(),
        state.pipeline.price_provider(),
        &symbol,
    )
    .await?;
    Ok(Json(quote))
}

/// GET /api/stocks/:symbol/news?days=N
async fn get_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<DaysParam>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    info!("GET /api/stocks/{}/news", symbol);

    let days = validate_days(params.days.unwrap_or(7))?;
    let since = Utc::now() - Duration::days(days);
    let items = state.store.fetch_news_since(&symbol, since).await?;

    if items.is_empty() {
        return Err(AppError::NotFound(format!("no news for {symbol}")));
    }
    Ok(Json(items))
}
