mod indicator;
mod news;
mod price_bar;
mod profile;
mod quote;
mod recommendation;
mod sentiment;

pub use indicator::IndicatorSnapshot;
pub use news::{ImpactLevel, NewsItem};
pub use price_bar::PriceBar;
pub use profile::StockProfile;
pub use quote::Quote;
pub use recommendation::{Action, Recommendation, RiskLevel};
pub use sentiment::SentimentSnapshot;
