use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lightweight real-time quote for the read surface. Served from the
/// live quote endpoint when reachable, otherwise derived from the two
/// most recent stored price bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub latest_trading_day: NaiveDate,
}
