mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{
    IndicatorSnapshot, NewsItem, PriceBar, Recommendation, SentimentSnapshot, StockProfile,
};

/// Storage boundary for the pipeline. Every time-series write is an
/// upsert keyed by (symbol, date), or (symbol, url) for news, so
/// re-running a stage can never duplicate rows; the last writer wins.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn get_profile(&self, symbol: &str) -> Result<Option<StockProfile>, AppError>;
    async fn upsert_profile(&self, profile: &StockProfile) -> Result<(), AppError>;

    /// Returns the number of rows written.
    async fn upsert_price_bars(&self, bars: &[PriceBar]) -> Result<u64, AppError>;
    /// Full history, ascending by date.
    async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<PriceBar>, AppError>;
    /// The most recent `limit` bars, newest first.
    async fn fetch_recent_bars(&self, symbol: &str, limit: i64) -> Result<Vec<PriceBar>, AppError>;

    async fn upsert_indicators(&self, rows: &[IndicatorSnapshot]) -> Result<u64, AppError>;
    async fn latest_indicators(&self, symbol: &str)
        -> Result<Option<IndicatorSnapshot>, AppError>;

    async fn upsert_news(&self, items: &[NewsItem]) -> Result<u64, AppError>;
    /// Items published at or after `since`, newest first.
    async fn fetch_news_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, AppError>;

    async fn upsert_sentiment(&self, snapshot: &SentimentSnapshot) -> Result<(), AppError>;
    async fn latest_sentiment(&self, symbol: &str)
        -> Result<Option<SentimentSnapshot>, AppError>;

    async fn upsert_recommendation(&self, rec: &Recommendation) -> Result<(), AppError>;
    async fn latest_recommendation(
        &self,
        symbol: &str,
    ) -> Result<Option<Recommendation>, AppError>;
}
