use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Daily sentiment aggregation for a ticker, built from the news items
/// published within a trailing window ending at `date`.
///
/// `social_sentiment` and `social_mention_count` are proxies derived
/// from the news figures (0.8x and 10x respectively); there is no
/// independent social-media signal feeding this table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SentimentSnapshot {
    pub id: Uuid,
    pub symbol: String,
    pub date: NaiveDate,
    pub news_sentiment: f64,
    pub social_sentiment: f64,
    /// Impact-weighted mean of the window's article scores, in [-1, 1].
    pub overall_sentiment: f64,
    pub news_mention_count: i64,
    pub social_mention_count: i64,
    /// Up to five vocabulary words found in the window's articles,
    /// in vocabulary order.
    pub trending_keywords: Vec<String>,
}
