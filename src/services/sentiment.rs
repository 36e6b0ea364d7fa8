use chrono::{Duration, NaiveDate};
use uuid::Uuid;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::models::{ImpactLevel, NewsItem, SentimentSnapshot};

/// Sources whose coverage moves markets hardest.
const HIGH_IMPACT_SOURCES: &[&str] = &[
    "Reuters",
    "Bloomberg",
    "Wall Street Journal",
    "Financial Times",
    "CNBC",
    "MarketWatch",
    "Yahoo Finance",
];

const MEDIUM_IMPACT_SOURCES: &[&str] = &[
    "CNN",
    "BBC",
    "Associated Press",
    "Forbes",
    "Business Insider",
];

/// Fixed vocabulary scanned for trending keywords, in reporting order.
/// Substring matching against this list is a deliberate simplification,
/// not keyword extraction.
const KEYWORD_VOCABULARY: &[&str] = &[
    "earnings",
    "revenue",
    "profit",
    "growth",
    "market",
    "stock",
    "investment",
    "analyst",
    "upgrade",
    "downgrade",
    "buy",
    "sell",
    "target",
    "price",
    "forecast",
    "outlook",
    "performance",
];

const MAX_TRENDING_KEYWORDS: usize = 5;

/// Social figures are proxied off the news figures; there is no
/// independent social-media feed.
const SOCIAL_SENTIMENT_FACTOR: f64 = 0.8;
const SOCIAL_MENTION_FACTOR: i64 = 10;

/// Lexical polarity scorer over article text.
///
/// Wraps the VADER compound score; the output contract is just the
/// range and sign convention: [-1, 1], positive = bullish.
pub struct SentimentScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Polarity of `text` in [-1, 1]. Empty text is neutral.
    pub fn score_text(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a source name into an impact level by membership in the
/// reputation lists. Unknown sources default to Low.
pub fn classify_impact(source: &str) -> ImpactLevel {
    if HIGH_IMPACT_SOURCES.iter().any(|s| source.contains(s)) {
        ImpactLevel::High
    } else if MEDIUM_IMPACT_SOURCES.iter().any(|s| source.contains(s)) {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

/// Aggregate the news items published within `[date - window_days, date]`
/// into a daily sentiment snapshot.
///
/// The overall score is the impact-weighted mean of the matching items'
/// sentiment scores (weights High 3 / Medium 2 / Low 1), clamped to
/// [-1, 1]. An empty window produces a neutral snapshot rather than an
/// error: overall 0.0, zero mentions, no keywords.
pub fn aggregate_daily(
    symbol: &str,
    date: NaiveDate,
    window_days: i64,
    items: &[NewsItem],
) -> SentimentSnapshot {
    let window_start = date - Duration::days(window_days);

    let in_window: Vec<&NewsItem> = items
        .iter()
        .filter(|item| {
            let published = item.published_at.date_naive();
            published >= window_start && published <= date
        })
        .collect();

    let news_sentiment = if in_window.is_empty() {
        0.0
    } else {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for item in &in_window {
            let weight = item.impact_level.weight() as f64;
            weighted_sum += item.sentiment_score * weight;
            total_weight += weight;
        }

        if total_weight == 0.0 {
            0.0
        } else {
            (weighted_sum / total_weight).clamp(-1.0, 1.0)
        }
    };

    let news_mention_count = in_window.len() as i64;

    SentimentSnapshot {
        id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        date,
        news_sentiment,
        social_sentiment: news_sentiment * SOCIAL_SENTIMENT_FACTOR,
        overall_sentiment: news_sentiment,
        news_mention_count,
        social_mention_count: news_mention_count * SOCIAL_MENTION_FACTOR,
        trending_keywords: trending_keywords(&in_window),
    }
}

/// Substring-match the fixed vocabulary against the window's article
/// text, returning up to five hits in vocabulary order.
fn trending_keywords(items: &[&NewsItem]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }

    let text: String = items
        .iter()
        .map(|item| format!("{} {}", item.title, item.summary))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    KEYWORD_VOCABULARY
        .iter()
        .filter(|word| text.contains(**word))
        .take(MAX_TRENDING_KEYWORDS)
        .map(|word| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(sentiment: f64, impact: ImpactLevel, days_ago: i64, title: &str) -> NewsItem {
        let published = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
            - Duration::days(days_ago);
        NewsItem {
            id: Uuid::new_v4(),
            symbol: "TEST".into(),
            title: title.into(),
            url: format!("https://example.com/{days_ago}-{sentiment}"),
            source: "Test Wire".into(),
            author: "Reporter".into(),
            summary: title.into(),
            content: title.into(),
            published_at: published,
            sentiment_score: sentiment,
            impact_level: impact,
        }
    }

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_classify_impact_lists() {
        assert_eq!(classify_impact("Reuters"), ImpactLevel::High);
        assert_eq!(classify_impact("Yahoo Finance"), ImpactLevel::High);
        assert_eq!(classify_impact("Forbes"), ImpactLevel::Medium);
        assert_eq!(classify_impact("Some Blog"), ImpactLevel::Low);
        // substring membership, not exact match
        assert_eq!(classify_impact("Bloomberg Markets"), ImpactLevel::High);
    }

    #[test]
    fn test_weighted_mean_uses_impact_weights() {
        let items = vec![
            item(1.0, ImpactLevel::High, 1, "strong quarter"),
            item(-1.0, ImpactLevel::Low, 1, "minor setback"),
        ];

        let snapshot = aggregate_daily("TEST", anchor(), 3, &items);
        // (1.0*3 + -1.0*1) / 4 = 0.5
        assert!((snapshot.overall_sentiment - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.news_mention_count, 2);
    }

    #[test]
    fn test_overall_sentiment_stays_in_range_at_extremes() {
        let items = vec![
            item(1.0, ImpactLevel::High, 0, "a"),
            item(1.0, ImpactLevel::High, 1, "b"),
            item(1.0, ImpactLevel::Medium, 2, "c"),
        ];
        let snapshot = aggregate_daily("TEST", anchor(), 3, &items);
        assert!(snapshot.overall_sentiment <= 1.0);
        assert!(snapshot.overall_sentiment >= -1.0);

        let items = vec![
            item(-1.0, ImpactLevel::High, 0, "a"),
            item(-1.0, ImpactLevel::Low, 1, "b"),
        ];
        let snapshot = aggregate_daily("TEST", anchor(), 3, &items);
        assert!(snapshot.overall_sentiment >= -1.0);
    }

    #[test]
    fn test_empty_window_is_neutral() {
        let snapshot = aggregate_daily("TEST", anchor(), 3, &[]);
        assert_eq!(snapshot.overall_sentiment, 0.0);
        assert_eq!(snapshot.news_mention_count, 0);
        assert!(snapshot.trending_keywords.is_empty());

        // items outside the window count for nothing
        let stale = vec![item(0.9, ImpactLevel::High, 10, "old news")];
        let snapshot = aggregate_daily("TEST", anchor(), 3, &stale);
        assert_eq!(snapshot.overall_sentiment, 0.0);
        assert_eq!(snapshot.news_mention_count, 0);
    }

    #[test]
    fn test_social_figures_are_proxies() {
        let items = vec![item(0.5, ImpactLevel::High, 1, "gains")];
        let snapshot = aggregate_daily("TEST", anchor(), 3, &items);
        assert!((snapshot.social_sentiment - snapshot.news_sentiment * 0.8).abs() < 1e-9);
        assert_eq!(snapshot.social_mention_count, snapshot.news_mention_count * 10);
    }

    #[test]
    fn test_trending_keywords_vocabulary_order_capped_at_five() {
        let items = vec![
            item(0.1, ImpactLevel::Low, 1, "analyst upgrade lifts outlook"),
            item(0.2, ImpactLevel::Low, 1, "earnings and revenue beat, profit growth"),
            item(0.3, ImpactLevel::Low, 1, "market eyes price target forecast"),
        ];
        let snapshot = aggregate_daily("TEST", anchor(), 3, &items);

        assert_eq!(snapshot.trending_keywords.len(), 5);
        // vocabulary order, not frequency order
        assert_eq!(snapshot.trending_keywords[0], "earnings");
        assert_eq!(snapshot.trending_keywords[1], "revenue");
    }

    #[test]
    fn test_score_text_range_and_sign() {
        let scorer = SentimentScorer::new();

        assert_eq!(scorer.score_text("   "), 0.0);

        let positive = scorer.score_text("Record profits, excellent growth, great quarter");
        let negative = scorer.score_text("Terrible losses, awful collapse, disastrous failure");
        assert!(positive > 0.0);
        assert!(negative < 0.0);
        assert!((-1.0..=1.0).contains(&positive));
        assert!((-1.0..=1.0).contains(&negative));
    }
}
