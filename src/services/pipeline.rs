use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::config::AcquisitionConfig;
use crate::external::news_provider::NewsProvider;
use crate::external::price_provider::PriceProvider;
use crate::services::indicators::compute_snapshots;
use crate::services::market_data::{self, DataSource};
use crate::services::recommendation::recommend;
use crate::services::sentiment::{aggregate_daily, SentimentScorer};
use crate::store::MarketStore;

/// How far a symbol got through the stages on one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolStatus {
    /// Every stage wrote its output.
    Complete,
    /// At least one stage wrote output, at least one failed.
    Partial,
    /// Nothing was written for this symbol.
    Failed,
}

/// Per-symbol outcome of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub status: SymbolStatus,
    pub price_bars: u64,
    pub indicator_rows: u64,
    pub news_items: u64,
    pub price_source: Option<DataSource>,
    pub news_source: Option<DataSource>,
    pub errors: Vec<String>,
}

/// Whether each live API actually served data at least once during the
/// batch. All-false with credentials configured usually means the keys
/// are bad or the vendor is throttling.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SourceSummary {
    pub prices_live: bool,
    pub news_live: bool,
}

/// Outcome of a batch run across several symbols.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub reports: Vec<SymbolReport>,
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
    pub sources: SourceSummary,
}

/// The end-to-end refresh: profile, prices, indicators, news,
/// sentiment aggregation, recommendation. Stages run in order and a
/// failed stage is recorded rather than raised, so one bad symbol (or
/// one flaky upstream) never takes down the batch.
pub struct Pipeline {
    store: Arc<dyn MarketStore>,
    price_provider: Option<Arc<dyn PriceProvider>>,
    news_provider: Option<Arc<dyn NewsProvider>>,
    scorer: SentimentScorer,
    config: AcquisitionConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn MarketStore>,
        price_provider: Option<Arc<dyn PriceProvider>>,
        news_provider: Option<Arc<dyn NewsProvider>>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            store,
            price_provider,
            news_provider,
            scorer: SentimentScorer::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn MarketStore> {
        &self.store
    }

    pub fn price_provider(&self) -> Option<&dyn PriceProvider> {
        self.price_provider.as_deref()
    }

    /// Run every stage for one symbol.
    pub async fn run_symbol(&self, symbol: &str) -> SymbolReport {
        info!("🔄 Running pipeline for {}", symbol);

        let mut report = SymbolReport {
            symbol: symbol.to_string(),
            status: SymbolStatus::Failed,
            price_bars: 0,
            indicator_rows: 0,
            news_items: 0,
            price_source: None,
            news_source: None,
            errors: Vec::new(),
        };
        let mut succeeded = 0usize;
        let mut failed = 0usize;

        let profile = match market_data::ensure_profile(
            self.store.as_ref(),
            self.price_provider.as_deref(),
            symbol,
        )
        .await
        {
            Ok(profile) => {
                succeeded += 1;
                Some(profile)
            }
            Err(e) => {
                error!("Profile stage failed for {}: {}", symbol, e);
                report.errors.push(format!("profile: {e}"));
                failed += 1;
                None
            }
        };

        match market_data::refresh_prices(
            self.store.as_ref(),
            self.price_provider.as_deref(),
            &self.config,
            symbol,
        )
        .await
        {
            Ok((written, source)) => {
                report.price_bars = written;
                report.price_source = Some(source);
                succeeded += 1;
            }
            Err(e) => {
                error!("Price stage failed for {}: {}", symbol, e);
                report.errors.push(format!("prices: {e}"));
                failed += 1;
            }
        }

        match self.refresh_indicators(symbol).await {
            Ok(rows) => {
                report.indicator_rows = rows;
                succeeded += 1;
            }
            Err(e) => {
                error!("Indicator stage failed for {}: {}", symbol, e);
                report.errors.push(format!("indicators: {e}"));
                failed += 1;
            }
        }

        let company_name = profile
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| symbol.to_string());

        match market_data::refresh_news(
            self.store.as_ref(),
            self.news_provider.as_deref(),
            &self.scorer,
            &self.config,
            symbol,
            &company_name,
        )
        .await
        {
            Ok((written, source)) => {
                report.news_items = written;
                report.news_source = Some(source);
                succeeded += 1;
            }
            Err(e) => {
                error!("News stage failed for {}: {}", symbol, e);
                report.errors.push(format!("news: {e}"));
                failed += 1;
            }
        }

        match self.refresh_sentiment(symbol).await {
            Ok(()) => succeeded += 1,
            Err(e) => {
                error!("Sentiment stage failed for {}: {}", symbol, e);
                report.errors.push(format!("sentiment: {e}"));
                failed += 1;
            }
        }

        match self.refresh_recommendation(symbol).await {
            Ok(()) => succeeded += 1,
            Err(e) => {
                error!("Recommendation stage failed for {}: {}", symbol, e);
                report.errors.push(format!("recommendation: {e}"));
                failed += 1;
            }
        }

        report.status = if failed == 0 {
            SymbolStatus::Complete
        } else if succeeded > 0 {
            SymbolStatus::Partial
        } else {
            SymbolStatus::Failed
        };

        info!(
            "✅ Pipeline finished for {}: {:?} ({} bars, {} indicator rows, {} articles)",
            symbol, report.status, report.price_bars, report.indicator_rows, report.news_items
        );

        report
    }

    /// Run the whole pipeline for each symbol in turn.
    pub async fn run_batch(&self, symbols: &[String]) -> BatchReport {
        let mut reports = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            reports.push(self.run_symbol(symbol).await);
        }

        let complete = reports
            .iter()
            .filter(|r| r.status == SymbolStatus::Complete)
            .count();
        let partial = reports
            .iter()
            .filter(|r| r.status == SymbolStatus::Partial)
            .count();
        let failed = reports
            .iter()
            .filter(|r| r.status == SymbolStatus::Failed)
            .count();

        let sources = SourceSummary {
            prices_live: reports
                .iter()
                .any(|r| r.price_source == Some(DataSource::Live)),
            news_live: reports
                .iter()
                .any(|r| r.news_source == Some(DataSource::Live)),
        };

        info!(
            "📦 Batch done: {} complete, {} partial, {} failed",
            complete, partial, failed
        );

        BatchReport {
            reports,
            complete,
            partial,
            failed,
            sources,
        }
    }

    async fn refresh_indicators(&self, symbol: &str) -> Result<u64, crate::errors::AppError> {
        let history = self.store.fetch_price_history(symbol).await?;
        let snapshots = compute_snapshots(&history);
        if snapshots.is_empty() {
            info!("Not enough history for indicators on {}", symbol);
            return Ok(0);
        }
        self.store.upsert_indicators(&snapshots).await
    }

    async fn refresh_sentiment(&self, symbol: &str) -> Result<(), crate::errors::AppError> {
        let today = Utc::now().date_naive();
        // Fetch from midnight of the window start; aggregate_daily does
        // the precise per-date filtering.
        let window_start = today - Duration::days(self.config.sentiment_window_days);
        let since = window_start.and_time(chrono::NaiveTime::MIN).and_utc();

        let items = self.store.fetch_news_since(symbol, since).await?;
        let snapshot = aggregate_daily(symbol, today, self.config.sentiment_window_days, &items);
        self.store.upsert_sentiment(&snapshot).await
    }

    async fn refresh_recommendation(&self, symbol: &str) -> Result<(), crate::errors::AppError> {
        let today = Utc::now().date_naive();

        let sentiment = self.store.latest_sentiment(symbol).await?;
        let technical = self.store.latest_indicators(symbol).await?;
        let latest_close = self
            .store
            .fetch_recent_bars(symbol, 1)
            .await?
            .first()
            .map(|b| b.close);

        let rec = recommend(
            symbol,
            today,
            sentiment.as_ref(),
            technical.as_ref(),
            latest_close,
        );
        self.store.upsert_recommendation(&rec).await
    }
}
