use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};

use crate::errors::AppError;
use crate::models::{
    IndicatorSnapshot, NewsItem, PriceBar, Recommendation, SentimentSnapshot, StockProfile,
};
use crate::store::MarketStore;

/// In-memory store used by tests and credential-less local runs.
/// Per-symbol BTreeMaps keyed by date give the same (symbol, date)
/// upsert semantics as the Postgres unique constraints.
#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<String, StockProfile>,
    prices: DashMap<String, BTreeMap<NaiveDate, PriceBar>>,
    indicators: DashMap<String, BTreeMap<NaiveDate, IndicatorSnapshot>>,
    news: DashMap<String, HashMap<String, NewsItem>>,
    sentiment: DashMap<String, BTreeMap<NaiveDate, SentimentSnapshot>>,
    recommendations: DashMap<String, BTreeMap<NaiveDate, Recommendation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn get_profile(&self, symbol: &str) -> Result<Option<StockProfile>, AppError> {
        Ok(self.profiles.get(symbol).map(|p| p.clone()))
    }

    async fn upsert_profile(&self, profile: &StockProfile) -> Result<(), AppError> {
        self.profiles
            .insert(profile.symbol.clone(), profile.clone());
        Ok(())
    }

    async fn upsert_price_bars(&self, bars: &[PriceBar]) -> Result<u64, AppError> {
        for bar in bars {
            self.prices
                .entry(bar.symbol.clone())
                .or_default()
                .insert(bar.date, bar.clone());
        }
        Ok(bars.len() as u64)
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<PriceBar>, AppError> {
        Ok(self
            .prices
            .get(symbol)
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_recent_bars(&self, symbol: &str, limit: i64) -> Result<Vec<PriceBar>, AppError> {
        Ok(self
            .prices
            .get(symbol)
            .map(|series| {
                series
                    .values()
                    .rev()
                    .take(limit.max(0) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_indicators(&self, rows: &[IndicatorSnapshot]) -> Result<u64, AppError> {
        for row in rows {
            self.indicators
                .entry(row.symbol.clone())
                .or_default()
                .insert(row.date, row.clone());
        }
        Ok(rows.len() as u64)
    }

    async fn latest_indicators(
        &self,
        symbol: &str,
    ) -> Result<Option<IndicatorSnapshot>, AppError> {
        Ok(self
            .indicators
            .get(symbol)
            .and_then(|series| series.values().next_back().cloned()))
    }

    async fn upsert_news(&self, items: &[NewsItem]) -> Result<u64, AppError> {
        for item in items {
            self.news
                .entry(item.symbol.clone())
                .or_default()
                .insert(item.url.clone(), item.clone());
        }
        Ok(items.len() as u64)
    }

    async fn fetch_news_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, AppError> {
        let mut items: Vec<NewsItem> = self
            .news
            .get(symbol)
            .map(|entries| {
                entries
                    .values()
                    .filter(|item| item.published_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(items)
    }

    async fn upsert_sentiment(&self, snapshot: &SentimentSnapshot) -> Result<(), AppError> {
        self.sentiment
            .entry(snapshot.symbol.clone())
            .or_default()
            .insert(snapshot.date, snapshot.clone());
        Ok(())
    }

    async fn latest_sentiment(
        &self,
        symbol: &str,
    ) -> Result<Option<SentimentSnapshot>, AppError> {
        Ok(self
            .sentiment
            .get(symbol)
            .and_then(|series| series.values().next_back().cloned()))
    }

    async fn upsert_recommendation(&self, rec: &Recommendation) -> Result<(), AppError> {
        self.recommendations
            .entry(rec.symbol.clone())
            .or_default()
            .insert(rec.date, rec.clone());
        Ok(())
    }

    async fn latest_recommendation(
        &self,
        symbol: &str,
    ) -> Result<Option<Recommendation>, AppError> {
        Ok(self
            .recommendations
            .get(symbol)
            .and_then(|series| series.values().next_back().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn bar(symbol: &str, date: NaiveDate, close: f64) -> PriceBar {
        PriceBar::new(symbol, date, close, close, close, close, 1_000_000)
    }

    #[tokio::test]
    async fn test_price_upsert_overwrites_same_date() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        store
            .upsert_price_bars(&[bar("AAPL", date, 180.0)])
            .await
            .unwrap();
        store
            .upsert_price_bars(&[bar("AAPL", date, 186.5)])
            .await
            .unwrap();

        let history = store.fetch_price_history("AAPL").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].close, 186.5);
    }

    #[tokio::test]
    async fn test_recent_bars_newest_first() {
        let store = MemoryStore::new();
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let bars: Vec<PriceBar> = (0..5)
            .map(|i| bar("MSFT", start + chrono::Duration::days(i), 100.0 + i as f64))
            .collect();
        store.upsert_price_bars(&bars).await.unwrap();

        let recent = store.fetch_recent_bars("MSFT", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].date > recent[1].date);
        assert_eq!(recent[0].close, 104.0);
    }

    #[tokio::test]
    async fn test_news_unique_per_url() {
        let store = MemoryStore::new();
        let item = NewsItem {
            id: Uuid::new_v4(),
            symbol: "AAPL".into(),
            title: "first".into(),
            url: "https://example.com/1".into(),
            source: "Reuters".into(),
            author: "".into(),
            summary: "".into(),
            content: "".into(),
            published_at: Utc::now(),
            sentiment_score: 0.5,
            impact_level: crate::models::ImpactLevel::High,
        };
        let mut updated = item.clone();
        updated.title = "second".into();

        store.upsert_news(&[item]).await.unwrap();
        store.upsert_news(&[updated]).await.unwrap();

        let items = store
            .fetch_news_since("AAPL", Utc::now() - chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "second");
    }
}
