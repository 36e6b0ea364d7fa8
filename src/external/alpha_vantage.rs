use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::error;

use super::price_provider::{ExternalOverview, ExternalPriceBar, ExternalQuote, PriceProvider};
use super::ProviderError;

const BASE_URL: &str = "https://www.alphavantage.co/query";

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, api_key })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        resp.json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct AvDailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, AvDailyBar>>,

    // Throttle payload:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct AvQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<AvQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvQuote {
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "06. volume")]
    volume: String,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: String,
    #[serde(rename = "09. change")]
    change: String,
    #[serde(rename = "10. change percent")]
    change_percent: String,
}

#[derive(Debug, Deserialize)]
struct AvOverviewResponse {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

fn check_vendor_errors(
    note: Option<String>,
    error_message: Option<String>,
) -> Result<(), ProviderError> {
    if note.is_some() {
        return Err(ProviderError::RateLimited);
    }
    if let Some(msg) = error_message {
        return Err(ProviderError::BadResponse(msg));
    }
    Ok(())
}

fn parse_bar(date_str: &str, bar: &AvDailyBar) -> Result<ExternalPriceBar, ProviderError> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| ProviderError::Parse(e.to_string()))?;

    let parse_f64 = |field: &str, name: &str| {
        field
            .parse::<f64>()
            .map_err(|e| ProviderError::Parse(format!("{name}: {e}")))
    };

    Ok(ExternalPriceBar {
        date,
        open: parse_f64(&bar.open, "open")?,
        high: parse_f64(&bar.high, "high")?,
        low: parse_f64(&bar.low, "low")?,
        close: parse_f64(&bar.close, "close")?,
        volume: bar
            .volume
            .parse::<i64>()
            .map_err(|e| ProviderError::Parse(format!("volume: {e}")))?,
    })
}

/// Parse "1234567890" (optionally with thousands separators) to i64.
fn parse_market_cap(raw: &str) -> i64 {
    raw.replace(',', "")
        .parse::<f64>()
        .map(|v| v as i64)
        .unwrap_or(0)
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<ExternalPriceBar>, ProviderError> {
        // compact covers the latest ~100 points
        let outputsize = if lookback_days <= 100 { "compact" } else { "full" };

        let body: AvDailyResponse = self
            .get_json(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", outputsize),
            ])
            .await?;

        check_vendor_errors(body.note, body.error_message)?;

        let series = body
            .time_series
            .ok_or_else(|| ProviderError::BadResponse("missing time series".into()))?;

        // BTreeMap of "YYYY-MM-DD" keys iterates ascending. Days that
        // fail to parse are skipped, not fatal.
        let mut out: Vec<ExternalPriceBar> = Vec::new();
        for (date_str, bar) in &series {
            match parse_bar(date_str, bar) {
                Ok(parsed) => out.push(parsed),
                Err(e) => {
                    error!("Skipping malformed bar for {} on {}: {}", symbol, date_str, e);
                }
            }
        }

        if out.is_empty() {
            return Err(ProviderError::BadResponse("no parsable bars".into()));
        }

        // Trim to the trailing lookback window, keeping ascending order.
        if lookback_days > 0 && (out.len() as u32) > lookback_days {
            let keep = lookback_days as usize;
            out = out.into_iter().rev().take(keep).collect::<Vec<_>>();
            out.reverse();
        }

        Ok(out)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<ExternalQuote, ProviderError> {
        let body: AvQuoteResponse = self
            .get_json(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;

        check_vendor_errors(body.note, body.error_message)?;

        let quote = body
            .quote
            .ok_or_else(|| ProviderError::BadResponse("no quote data found".into()))?;

        let parse_f64 = |field: &str, name: &str| {
            field
                .parse::<f64>()
                .map_err(|e| ProviderError::Parse(format!("{name}: {e}")))
        };

        Ok(ExternalQuote {
            price: parse_f64(&quote.price, "price")?,
            change: parse_f64(&quote.change, "change")?,
            change_percent: parse_f64(quote.change_percent.trim_end_matches('%'), "change percent")?,
            volume: quote
                .volume
                .parse::<i64>()
                .map_err(|e| ProviderError::Parse(format!("volume: {e}")))?,
            latest_trading_day: NaiveDate::parse_from_str(&quote.latest_trading_day, "%Y-%m-%d")
                .map_err(|e| ProviderError::Parse(e.to_string()))?,
        })
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<ExternalOverview, ProviderError> {
        let body: AvOverviewResponse = self
            .get_json(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;

        check_vendor_errors(body.note, body.error_message)?;

        Ok(ExternalOverview {
            name: body.name.unwrap_or_else(|| format!("{symbol} Corporation")),
            sector: body.sector.unwrap_or_else(|| "Technology".to_string()),
            industry: body.industry.unwrap_or_else(|| "Software".to_string()),
            market_cap: body.market_cap.as_deref().map(parse_market_cap).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_note_is_rate_limit() {
        let result = check_vendor_errors(Some("Thank you for using Alpha Vantage!".into()), None);
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }

    #[test]
    fn test_vendor_error_message_is_bad_response() {
        let result = check_vendor_errors(None, Some("Invalid API call.".into()));
        assert!(matches!(result, Err(ProviderError::BadResponse(_))));
    }

    #[test]
    fn test_parse_bar_rejects_garbage() {
        let bar = AvDailyBar {
            open: "185.50".into(),
            high: "187.00".into(),
            low: "not-a-number".into(),
            close: "186.10".into(),
            volume: "55000000".into(),
        };
        assert!(parse_bar("2024-06-10", &bar).is_err());
    }

    #[test]
    fn test_parse_market_cap() {
        assert_eq!(parse_market_cap("3000000000000"), 3_000_000_000_000);
        assert_eq!(parse_market_cap("1,234,567"), 1_234_567);
        assert_eq!(parse_market_cap("None"), 0);
    }
}
