use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::error;

use super::news_provider::{ExternalArticle, NewsProvider};
use super::ProviderError;

const BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Cap on articles taken from one search response.
const MAX_ARTICLES: usize = 20;

pub struct NewsApiProvider {
    client: reqwest::Client,
    api_key: String,
}

impl NewsApiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, api_key })
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    message: Option<String>,
    articles: Option<Vec<NewsApiArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: NewsApiSource,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: String,
    published_at: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

fn parse_article(raw: NewsApiArticle) -> Result<ExternalArticle, ProviderError> {
    let published_at: DateTime<Utc> = raw
        .published_at
        .parse()
        .map_err(|e| ProviderError::Parse(format!("publishedAt: {e}")))?;

    Ok(ExternalArticle {
        title: raw.title.unwrap_or_default(),
        url: raw.url,
        source: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
        author: raw.author.unwrap_or_default(),
        summary: raw.description.unwrap_or_default(),
        content: raw.content.unwrap_or_default(),
        published_at,
    })
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_articles(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExternalArticle>, ProviderError> {
        let from = from.to_string();
        let to = to.to_string();

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let body: NewsApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.status != "ok" {
            let message = body.message.unwrap_or_else(|| "unknown error".to_string());
            if message.to_lowercase().contains("rate") {
                return Err(ProviderError::RateLimited);
            }
            return Err(ProviderError::BadResponse(message));
        }

        // Malformed entries are skipped; the rest of the page survives.
        let articles = body
            .articles
            .unwrap_or_default()
            .into_iter()
            .take(MAX_ARTICLES)
            .filter_map(|raw| {
                let url = raw.url.clone();
                match parse_article(raw) {
                    Ok(article) => Some(article),
                    Err(e) => {
                        error!("Skipping malformed article {}: {}", url, e);
                        None
                    }
                }
            })
            .collect();

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, published_at: &str) -> NewsApiArticle {
        NewsApiArticle {
            source: NewsApiSource {
                name: Some("Reuters".into()),
            },
            author: Some("Reporter".into()),
            title: Some("Title".into()),
            description: Some("Summary".into()),
            url: url.into(),
            published_at: published_at.into(),
            content: Some("Content".into()),
        }
    }

    #[test]
    fn test_parse_article_rfc3339() {
        let article = parse_article(raw("https://example.com/a", "2024-06-10T12:30:00Z")).unwrap();
        assert_eq!(article.source, "Reuters");
        assert_eq!(article.published_at.date_naive().to_string(), "2024-06-10");
    }

    #[test]
    fn test_parse_article_bad_date_is_error() {
        assert!(parse_article(raw("https://example.com/a", "yesterday-ish")).is_err());
    }
}
