use std::time::Duration;

/// Settings for the data acquisition layer, read from the environment.
///
/// A credential only counts as configured when it is non-empty and not
/// the placeholder value "demo", the same rule the vendor's own demo
/// keys would otherwise trip over.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub alpha_vantage_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub request_timeout: Duration,
    pub price_lookback_days: u32,
    pub news_lookback_days: u32,
    pub sentiment_window_days: i64,
}

impl AcquisitionConfig {
    pub fn from_env() -> Self {
        Self {
            alpha_vantage_api_key: read_credential("ALPHA_VANTAGE_API_KEY"),
            news_api_key: read_credential("NEWS_API_KEY"),
            request_timeout: Duration::from_secs(
                std::env::var("ACQUISITION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            price_lookback_days: std::env::var("PRICE_LOOKBACK_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            news_lookback_days: std::env::var("NEWS_LOOKBACK_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            sentiment_window_days: std::env::var("SENTIMENT_WINDOW_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }

    /// Config with no live credentials: everything comes from the
    /// synthetic generators. Used by tests and local runs.
    pub fn offline() -> Self {
        Self {
            alpha_vantage_api_key: None,
            news_api_key: None,
            request_timeout: Duration::from_secs(15),
            price_lookback_days: 30,
            news_lookback_days: 7,
            sentiment_window_days: 3,
        }
    }
}

fn read_credential(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "demo")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_config_has_no_credentials() {
        let config = AcquisitionConfig::offline();
        assert!(config.alpha_vantage_api_key.is_none());
        assert!(config.news_api_key.is_none());
        assert_eq!(config.price_lookback_days, 30);
    }
}
