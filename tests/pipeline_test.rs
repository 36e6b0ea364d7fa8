//! End-to-end pipeline runs over the in-memory store with no live
//! providers configured: everything comes from the synthetic
//! generators, which makes the expected outputs exact.

use std::sync::Arc;

use stockpulse_backend::config::AcquisitionConfig;
use stockpulse_backend::models::{Action, RiskLevel};
use stockpulse_backend::services::market_data;
use stockpulse_backend::services::pipeline::{Pipeline, SymbolStatus};
use stockpulse_backend::store::{MarketStore, MemoryStore};

fn offline_pipeline() -> (Arc<MemoryStore>, Pipeline) {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(store.clone(), None, None, AcquisitionConfig::offline());
    (store, pipeline)
}

#[tokio::test]
async fn full_run_populates_every_table() {
    let (store, pipeline) = offline_pipeline();

    let report = pipeline.run_symbol("AAPL").await;
    assert_eq!(report.status, SymbolStatus::Complete);
    assert!(report.errors.is_empty());
    assert_eq!(report.price_bars, 30);
    assert_eq!(report.news_items, 3);

    let profile = store.get_profile("AAPL").await.unwrap().unwrap();
    assert_eq!(profile.name, "Apple Inc.");
    assert_eq!(profile.sector, "Technology");

    let history = store.fetch_price_history("AAPL").await.unwrap();
    assert_eq!(history.len(), 30);
    // The synthetic walk anchors the most recent close at the base price.
    assert!((history.last().unwrap().close - 185.92).abs() < 1e-9);
    // Ascending by date, each bar internally consistent.
    for pair in history.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    for bar in &history {
        assert!(bar.high >= bar.open.max(bar.close));
        assert!(bar.low <= bar.open.min(bar.close));
    }

    let indicators = store.latest_indicators("AAPL").await.unwrap().unwrap();
    // 30 bars is enough for RSI-14 and SMA-20, not SMA-50/200.
    assert!(indicators.rsi.is_some());
    assert!(indicators.sma_20.is_some());
    assert!(indicators.sma_50.is_none());
    assert!(indicators.sma_200.is_none());

    let sentiment = store.latest_sentiment("AAPL").await.unwrap().unwrap();
    // Template scores 0.75, 0.65, -0.35 from equally-weighted
    // high-impact sources: mean 0.35.
    assert_eq!(sentiment.news_mention_count, 3);
    assert_eq!(sentiment.social_mention_count, 30);
    assert!((sentiment.overall_sentiment - 0.35).abs() < 1e-9);
    assert!((sentiment.social_sentiment - 0.28).abs() < 1e-9);

    let rec = store.latest_recommendation("AAPL").await.unwrap().unwrap();
    assert_eq!(rec.model_version, "2.0-enhanced");
    assert!(matches!(rec.action, Action::Buy | Action::Hold | Action::Sell));
    assert!(matches!(
        rec.risk_level,
        RiskLevel::Low | RiskLevel::Medium | RiskLevel::High
    ));
    assert!(rec.confidence >= 50.0 && rec.confidence <= 90.0);
    assert!(rec.target_price > 0.0);
    assert!((rec.fundamental_weight - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let (store, pipeline) = offline_pipeline();

    let first = pipeline.run_symbol("TSLA").await;
    assert_eq!(first.status, SymbolStatus::Complete);

    let second = pipeline.run_symbol("TSLA").await;
    assert_eq!(second.status, SymbolStatus::Complete);

    // Upserts keyed by (symbol, date) / (symbol, url): re-running
    // replaces rows instead of duplicating them.
    let history = store.fetch_price_history("TSLA").await.unwrap();
    assert_eq!(history.len(), 30);

    let since = chrono::Utc::now() - chrono::Duration::days(30);
    let news = store.fetch_news_since("TSLA", since).await.unwrap();
    assert_eq!(news.len(), 3);
}

#[tokio::test]
async fn unknown_symbol_uses_generic_templates() {
    let (store, pipeline) = offline_pipeline();

    let report = pipeline.run_symbol("ZZZZ").await;
    assert_eq!(report.status, SymbolStatus::Complete);

    let profile = store.get_profile("ZZZZ").await.unwrap().unwrap();
    assert_eq!(profile.name, "ZZZZ Corporation");

    let sentiment = store.latest_sentiment("ZZZZ").await.unwrap().unwrap();
    assert_eq!(sentiment.news_mention_count, 3);
    // Generic template scores 0.5, 0.6, -0.2: mean 0.3.
    assert!((sentiment.overall_sentiment - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn batch_reports_per_symbol_outcomes() {
    let (_store, pipeline) = offline_pipeline();

    let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
    let batch = pipeline.run_batch(&symbols).await;

    assert_eq!(batch.reports.len(), 2);
    assert_eq!(batch.complete, 2);
    assert_eq!(batch.partial, 0);
    assert_eq!(batch.failed, 0);
    assert_eq!(batch.reports[0].symbol, "AAPL");
    assert_eq!(batch.reports[1].symbol, "MSFT");
    // No providers configured, so nothing live was reached.
    assert!(!batch.sources.prices_live);
    assert!(!batch.sources.news_live);
}

#[tokio::test]
async fn quote_falls_back_to_stored_bars() {
    let (store, pipeline) = offline_pipeline();
    pipeline.run_symbol("GOOGL").await;

    let quote = market_data::get_quote(store.as_ref(), None, "GOOGL")
        .await
        .unwrap();
    assert!((quote.price - 142.18).abs() < 1e-9);

    let recent = store.fetch_recent_bars("GOOGL", 2).await.unwrap();
    let expected_change = recent[0].close - recent[1].close;
    assert!((quote.change - expected_change).abs() < 1e-9);
    assert_eq!(quote.latest_trading_day, recent[0].date);
}
