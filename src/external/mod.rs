pub mod alpha_vantage;
pub mod news_api;
pub mod news_provider;
pub mod price_provider;
pub mod synthetic;

use thiserror::Error;

/// Errors surfaced by the live data providers. They never cross the
/// acquisition boundary: the market data service recovers every variant
/// by falling back to synthetic generation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}
