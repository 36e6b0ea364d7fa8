use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::error;

use crate::errors::AppError;
use crate::models::{
    IndicatorSnapshot, NewsItem, PriceBar, Recommendation, SentimentSnapshot, StockProfile,
};
use crate::store::MarketStore;

/// Postgres-backed store. All writes go through
/// `ON CONFLICT ... DO UPDATE` so repeated pipeline runs stay
/// idempotent per (symbol, date) / (symbol, url).
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Db(e.into()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn get_profile(&self, symbol: &str) -> Result<Option<StockProfile>, AppError> {
        let profile = sqlx::query_as::<_, StockProfile>(
            "SELECT id, symbol, name, sector, industry, market_cap
             FROM stock_profiles
             WHERE symbol = $1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert_profile(&self, profile: &StockProfile) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO stock_profiles (id, symbol, name, sector, industry, market_cap)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (symbol)
             DO UPDATE SET name = EXCLUDED.name,
                           sector = EXCLUDED.sector,
                           industry = EXCLUDED.industry,
                           market_cap = EXCLUDED.market_cap",
        )
        .bind(profile.id)
        .bind(&profile.symbol)
        .bind(&profile.name)
        .bind(&profile.sector)
        .bind(&profile.industry)
        .bind(profile.market_cap)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_price_bars(&self, bars: &[PriceBar]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        for bar in bars {
            if let Err(e) = sqlx::query(
                "INSERT INTO price_bars
                     (id, symbol, date, open, high, low, close, volume, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT (symbol, date)
                 DO UPDATE SET open = EXCLUDED.open,
                               high = EXCLUDED.high,
                               low = EXCLUDED.low,
                               close = EXCLUDED.close,
                               volume = EXCLUDED.volume",
            )
            .bind(bar.id)
            .bind(&bar.symbol)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(bar.created_at)
            .execute(&mut *tx)
            .await
            {
                error!(
                    "Failed to upsert price bar for {} on {}: {}",
                    bar.symbol, bar.date, e
                );
                return Err(AppError::Db(e));
            }
        }

        tx.commit().await?;
        Ok(bars.len() as u64)
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<PriceBar>, AppError> {
        let bars = sqlx::query_as::<_, PriceBar>(
            "SELECT id, symbol, date, open, high, low, close, volume, created_at
             FROM price_bars
             WHERE symbol = $1
             ORDER BY date ASC",
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        Ok(bars)
    }

    async fn fetch_recent_bars(&self, symbol: &str, limit: i64) -> Result<Vec<PriceBar>, AppError> {
        let bars = sqlx::query_as::<_, PriceBar>(
            "SELECT id, symbol, date, open, high, low, close, volume, created_at
             FROM price_bars
             WHERE symbol = $1
             ORDER BY date DESC
             LIMIT $2",
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(bars)
    }

    async fn upsert_indicators(&self, rows: &[IndicatorSnapshot]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO indicator_snapshots
                     (id, symbol, date, rsi, sma_20, sma_50, sma_200, ema_12, ema_26,
                      macd, macd_signal, bollinger_upper, bollinger_lower)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 ON CONFLICT (symbol, date)
                 DO UPDATE SET rsi = EXCLUDED.rsi,
                               sma_20 = EXCLUDED.sma_20,
                               sma_50 = EXCLUDED.sma_50,
                               sma_200 = EXCLUDED.sma_200,
                               ema_12 = EXCLUDED.ema_12,
                               ema_26 = EXCLUDED.ema_26,
                               macd = EXCLUDED.macd,
                               macd_signal = EXCLUDED.macd_signal,
                               bollinger_upper = EXCLUDED.bollinger_upper,
                               bollinger_lower = EXCLUDED.bollinger_lower",
            )
            .bind(row.id)
            .bind(&row.symbol)
            .bind(row.date)
            .bind(row.rsi)
            .bind(row.sma_20)
            .bind(row.sma_50)
            .bind(row.sma_200)
            .bind(row.ema_12)
            .bind(row.ema_26)
            .bind(row.macd)
            .bind(row.macd_signal)
            .bind(row.bollinger_upper)
            .bind(row.bollinger_lower)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows.len() as u64)
    }

    async fn latest_indicators(
        &self,
        symbol: &str,
    ) -> Result<Option<IndicatorSnapshot>, AppError> {
        let row = sqlx::query_as::<_, IndicatorSnapshot>(
            "SELECT id, symbol, date, rsi, sma_20, sma_50, sma_200, ema_12, ema_26,
                    macd, macd_signal, bollinger_upper, bollinger_lower
             FROM indicator_snapshots
             WHERE symbol = $1
             ORDER BY date DESC
             LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_news(&self, items: &[NewsItem]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                "INSERT INTO news_items
                     (id, symbol, title, url, source, author, summary, content,
                      published_at, sentiment_score, impact_level)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (symbol, url)
                 DO UPDATE SET title = EXCLUDED.title,
                               source = EXCLUDED.source,
                               author = EXCLUDED.author,
                               summary = EXCLUDED.summary,
                               content = EXCLUDED.content,
                               published_at = EXCLUDED.published_at,
                               sentiment_score = EXCLUDED.sentiment_score,
                               impact_level = EXCLUDED.impact_level",
            )
            .bind(item.id)
            .bind(&item.symbol)
            .bind(&item.title)
            .bind(&item.url)
            .bind(&item.source)
            .bind(&item.author)
            .bind(&item.summary)
            .bind(&item.content)
            .bind(item.published_at)
            .bind(item.sentiment_score)
            .bind(item.impact_level)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(items.len() as u64)
    }

    async fn fetch_news_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, AppError> {
        let items = sqlx::query_as::<_, NewsItem>(
            "SELECT id, symbol, title, url, source, author, summary, content,
                    published_at, sentiment_score, impact_level
             FROM news_items
             WHERE symbol = $1 AND published_at >= $2
             ORDER BY published_at DESC",
        )
        .bind(symbol)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn upsert_sentiment(&self, snapshot: &SentimentSnapshot) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sentiment_snapshots
                 (id, symbol, date, news_sentiment, social_sentiment, overall_sentiment,
                  news_mention_count, social_mention_count, trending_keywords)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (symbol, date)
             DO UPDATE SET news_sentiment = EXCLUDED.news_sentiment,
                           social_sentiment = EXCLUDED.social_sentiment,
                           overall_sentiment = EXCLUDED.overall_sentiment,
                           news_mention_count = EXCLUDED.news_mention_count,
                           social_mention_count = EXCLUDED.social_mention_count,
                           trending_keywords = EXCLUDED.trending_keywords",
        )
        .bind(snapshot.id)
        .bind(&snapshot.symbol)
        .bind(snapshot.date)
        .bind(snapshot.news_sentiment)
        .bind(snapshot.social_sentiment)
        .bind(snapshot.overall_sentiment)
        .bind(snapshot.news_mention_count)
        .bind(snapshot.social_mention_count)
        .bind(&snapshot.trending_keywords)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_sentiment(
        &self,
        symbol: &str,
    ) -> Result<Option<SentimentSnapshot>, AppError> {
        let row = sqlx::query_as::<_, SentimentSnapshot>(
            "SELECT id, symbol, date, news_sentiment, social_sentiment, overall_sentiment,
                    news_mention_count, social_mention_count, trending_keywords
             FROM sentiment_snapshots
             WHERE symbol = $1
             ORDER BY date DESC
             LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_recommendation(&self, rec: &Recommendation) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO recommendations
                 (id, symbol, date, action, confidence, sentiment_weight, technical_weight,
                  fundamental_weight, risk_level, target_price, model_version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (symbol, date)
             DO UPDATE SET action = EXCLUDED.action,
                           confidence = EXCLUDED.confidence,
                           sentiment_weight = EXCLUDED.sentiment_weight,
                           technical_weight = EXCLUDED.technical_weight,
                           fundamental_weight = EXCLUDED.fundamental_weight,
                           risk_level = EXCLUDED.risk_level,
                           target_price = EXCLUDED.target_price,
                           model_version = EXCLUDED.model_version",
        )
        .bind(rec.id)
        .bind(&rec.symbol)
        .bind(rec.date)
        .bind(rec.action)
        .bind(rec.confidence)
        .bind(rec.sentiment_weight)
        .bind(rec.technical_weight)
        .bind(rec.fundamental_weight)
        .bind(rec.risk_level)
        .bind(rec.target_price)
        .bind(&rec.model_version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_recommendation(
        &self,
        symbol: &str,
    ) -> Result<Option<Recommendation>, AppError> {
        let row = sqlx::query_as::<_, Recommendation>(
            "SELECT id, symbol, date, action, confidence, sentiment_weight, technical_weight,
                    fundamental_weight, risk_level, target_price, model_version
             FROM recommendations
             WHERE symbol = $1
             ORDER BY date DESC
             LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
