use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// One daily OHLCV bar for a ticker. Unique per (symbol, date),
// immutable once written apart from upserts replacing the whole row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceBar {
    pub id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub created_at: DateTime<Utc>,
}

impl PriceBar {
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            date,
            open,
            high,
            low,
            close,
            volume,
            created_at: Utc::now(),
        }
    }
}
