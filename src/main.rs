use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::net::TcpListener;
use tracing::{info, warn};

use stockpulse_backend::app;
use stockpulse_backend::config::AcquisitionConfig;
use stockpulse_backend::external::alpha_vantage::AlphaVantageProvider;
use stockpulse_backend::external::news_api::NewsApiProvider;
use stockpulse_backend::external::news_provider::NewsProvider;
use stockpulse_backend::external::price_provider::PriceProvider;
use stockpulse_backend::logging::{self, LoggingConfig};
use stockpulse_backend::services::pipeline::Pipeline;
use stockpulse_backend::state::AppState;
use stockpulse_backend::store::{MarketStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    let config = AcquisitionConfig::from_env();

    let store: Arc<dyn MarketStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            info!("🗄️ Connecting to Postgres");
            Arc::new(PgStore::connect(&url).await?)
        }
        Err(_) => {
            warn!("⚠️ DATABASE_URL not set - using in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let price_provider: Option<Arc<dyn PriceProvider>> = match &config.alpha_vantage_api_key {
        Some(key) => {
            info!("📊 Using live price provider: Alpha Vantage");
            Some(Arc::new(AlphaVantageProvider::new(
                key.clone(),
                config.request_timeout,
            )?))
        }
        None => {
            warn!("⚠️ ALPHA_VANTAGE_API_KEY not set - price data will be synthetic");
            None
        }
    };

    let news_provider: Option<Arc<dyn NewsProvider>> = match &config.news_api_key {
        Some(key) => {
            info!("📰 Using live news provider: NewsAPI");
            Some(Arc::new(NewsApiProvider::new(
                key.clone(),
                config.request_timeout,
            )?))
        }
        None => {
            warn!("⚠️ NEWS_API_KEY not set - news data will be synthetic");
            None
        }
    };

    let pipeline = Arc::new(Pipeline::new(
        store.clone(),
        price_provider,
        news_provider,
        config,
    ));

    let state = AppState { store, pipeline };
    let app = app::create_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 StockPulse backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
