use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Editorial weight of a news source, used when aggregating sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "impact_level", rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// Integer weight applied in daily sentiment aggregation.
    pub fn weight(self) -> i64 {
        match self {
            ImpactLevel::Low => 1,
            ImpactLevel::Medium => 2,
            ImpactLevel::High => 3,
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactLevel::Low => write!(f, "LOW"),
            ImpactLevel::Medium => write!(f, "MEDIUM"),
            ImpactLevel::High => write!(f, "HIGH"),
        }
    }
}

/// A scored news article for a ticker. Unique per (symbol, url).
/// `sentiment_score` is always clamped to [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsItem {
    pub id: Uuid,
    pub symbol: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub author: String,
    pub summary: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub sentiment_score: f64,
    pub impact_level: ImpactLevel,
}
