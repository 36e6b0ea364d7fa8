use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Technical indicator values derived from price history up to and
/// including `date`. Fields are `None` while their lookback window has
/// not filled yet (e.g. sma_200 on day 30). Snapshots only exist for
/// dates with at least 20 bars of history behind them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IndicatorSnapshot {
    pub id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub rsi: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}
