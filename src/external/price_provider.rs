use async_trait::async_trait;
use chrono::NaiveDate;

use super::ProviderError;

/// One daily OHLCV bar as delivered by an upstream quote API.
#[derive(Debug, Clone)]
pub struct ExternalPriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A point-in-time quote from the live endpoint.
#[derive(Debug, Clone)]
pub struct ExternalQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub latest_trading_day: NaiveDate,
}

/// Company overview metadata.
#[derive(Debug, Clone)]
pub struct ExternalOverview {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: i64,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily series for the trailing `lookback_days`, ascending by date.
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<ExternalPriceBar>, ProviderError>;

    async fn fetch_quote(&self, symbol: &str) -> Result<ExternalQuote, ProviderError>;

    async fn fetch_overview(&self, symbol: &str) -> Result<ExternalOverview, ProviderError>;
}
