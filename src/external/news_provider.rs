use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::ProviderError;

/// A raw article from a news search API, before sentiment scoring.
#[derive(Debug, Clone)]
pub struct ExternalArticle {
    pub title: String,
    pub url: String,
    pub source: String,
    pub author: String,
    pub summary: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Articles matching `query` published within `[from, to]`,
    /// newest first.
    async fn fetch_articles(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExternalArticle>, ProviderError>;
}
