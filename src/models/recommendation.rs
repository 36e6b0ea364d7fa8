use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The discrete recommendation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "trade_action", rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Hold => write!(f, "HOLD"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "risk_level", rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// A BUY/HOLD/SELL call for a ticker on a given date, derived from the
/// latest indicator snapshot, sentiment snapshot and price bar.
///
/// The weight columns record the inputs that produced the call:
/// `sentiment_weight` and `technical_weight` are the component scores
/// scaled by 100. `fundamental_weight` is a fixed placeholder; no
/// fundamental data source feeds this model.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub action: Action,
    /// Clamped to [0, 100].
    pub confidence: f64,
    pub sentiment_weight: f64,
    pub technical_weight: f64,
    pub fundamental_weight: f64,
    pub risk_level: RiskLevel,
    pub target_price: f64,
    pub model_version: String,
}
