use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::news_provider::ExternalArticle;
use super::price_provider::{ExternalOverview, ExternalPriceBar};

/// Deterministic synthetic market data, standing in for the live APIs
/// whenever they are unconfigured or failing.
///
/// Generators are seeded from the symbol, so the same symbol always
/// produces the same series shape; the walk itself is a random
/// ±5%/day drift around the symbol's base price, with the most recent
/// close anchored at the base price exactly.
pub struct SyntheticData;

/// Preset anchor prices for the well-known demo symbols. Anything else
/// walks around 100.0.
fn base_price(symbol: &str) -> f64 {
    match symbol {
        "AAPL" => 185.92,
        "TSLA" => 248.50,
        "GOOGL" => 142.18,
        "MSFT" => 378.85,
        "AMZN" => 155.89,
        _ => 100.0,
    }
}

/// FNV-1a over the symbol bytes; only has to be stable, not strong.
fn symbol_seed(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

/// Template articles: (title, summary, preset sentiment score).
type Template = (&'static str, &'static str, f64);

fn news_templates(symbol: &str) -> Option<&'static [Template]> {
    match symbol {
        "AAPL" => Some(&[
            (
                "Apple Reports Strong Q4 Earnings",
                "Apple Inc. reported quarterly revenue of $89.5 billion, surpassing analyst expectations.",
                0.75,
            ),
            (
                "New iPhone AI Features Drive Interest",
                "Apple's latest AI-powered features are generating significant consumer interest.",
                0.65,
            ),
            (
                "Supply Chain Concerns May Impact Production",
                "Industry analysts warn about potential supply chain disruptions.",
                -0.35,
            ),
        ]),
        "TSLA" => Some(&[
            (
                "Tesla Delivery Numbers Fall Short",
                "Tesla reported delivery numbers below analyst estimates.",
                -0.45,
            ),
            (
                "Autopilot Technology Receives Update",
                "Tesla's latest Autopilot update includes enhanced safety features.",
                0.70,
            ),
            (
                "EV Competition Intensifies",
                "Traditional automakers are expanding their EV offerings.",
                -0.25,
            ),
        ]),
        "GOOGL" => Some(&[
            (
                "Google Cloud Revenue Surges",
                "Alphabet's cloud division reported strong growth in latest quarter.",
                0.80,
            ),
            (
                "Bard AI Chatbot Gains Capabilities",
                "Google's AI assistant receives significant updates.",
                0.60,
            ),
            (
                "Regulatory Scrutiny Increases",
                "European regulators considering additional measures.",
                -0.40,
            ),
        ]),
        "MSFT" => Some(&[
            (
                "Microsoft Azure Growth Continues",
                "Azure cloud services show strong quarterly performance.",
                0.75,
            ),
            (
                "AI Integration Across Products",
                "Microsoft integrating AI capabilities across product suite.",
                0.65,
            ),
            (
                "Enterprise Adoption Increases",
                "More enterprises adopting Microsoft cloud solutions.",
                0.55,
            ),
        ]),
        "AMZN" => Some(&[
            (
                "Amazon Prime Day Success",
                "Record-breaking sales during Prime Day event.",
                0.70,
            ),
            (
                "AWS Market Share Grows",
                "Amazon Web Services maintains cloud market leadership.",
                0.60,
            ),
            (
                "Logistics Challenges Persist",
                "Supply chain issues continue to impact operations.",
                -0.30,
            ),
        ]),
        _ => None,
    }
}

/// Sources for template articles, by article index. All sit on the
/// high-reputation list so the aggregation weights stay predictable.
const TEMPLATE_SOURCES: &[&str] = &["Reuters", "Bloomberg", "CNBC"];

/// A synthetic article paired with its preset sentiment score.
#[derive(Debug, Clone)]
pub struct SyntheticArticle {
    pub article: ExternalArticle,
    pub sentiment_score: f64,
}

impl SyntheticData {
    /// Random-walk daily series of `days` bars ending yesterday,
    /// ascending by date, last close anchored at the base price.
    pub fn price_series(symbol: &str, days: u32, today: NaiveDate) -> Vec<ExternalPriceBar> {
        let base = base_price(symbol);
        let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));
        let days = days.max(1) as i64;

        let mut bars = Vec::with_capacity(days as usize);
        for i in (1..=days).rev() {
            let date = today - Duration::days(i);

            let daily_change: f64 = rng.random_range(-0.05..0.05);
            let close = if i == 1 {
                base
            } else {
                base * (1.0 + daily_change * (days - i) as f64 / days as f64)
            };

            let open = close * rng.random_range(0.98..1.02);
            let high = open.max(close) * rng.random_range(1.0..1.03);
            let low = open.min(close) * rng.random_range(0.97..1.0);
            let volume: i64 = rng.random_range(20_000_000..100_000_000);

            bars.push(ExternalPriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars
    }

    /// Three template articles with preset sentiment scores. Unknown
    /// symbols get a generic profile-shaped template; synthesis never
    /// fails on an unrecognized symbol.
    pub fn articles(symbol: &str, company_name: &str, now: DateTime<Utc>) -> Vec<SyntheticArticle> {
        let rendered: Vec<(String, String, f64)> = match news_templates(symbol) {
            Some(templates) => templates
                .iter()
                .map(|&(title, summary, score)| (title.to_string(), summary.to_string(), score))
                .collect(),
            None => vec![
                (
                    format!("{symbol} Shows Strong Performance"),
                    format!("{company_name} continues to demonstrate solid fundamentals."),
                    0.5,
                ),
                (
                    format!("Analysts Bullish on {symbol}"),
                    format!("Market analysts express optimism about {company_name}'s prospects."),
                    0.6,
                ),
                (
                    format!("{symbol} Faces Market Headwinds"),
                    format!("{company_name} navigating challenging market conditions."),
                    -0.2,
                ),
            ],
        };

        rendered
            .into_iter()
            .enumerate()
            .map(|(i, (title, summary, score))| SyntheticArticle {
                article: ExternalArticle {
                    title,
                    url: format!(
                        "https://example.com/news/{}-{}",
                        symbol.to_lowercase(),
                        i + 1
                    ),
                    source: TEMPLATE_SOURCES[i % TEMPLATE_SOURCES.len()].to_string(),
                    author: format!("Reporter {}", i + 1),
                    content: format!(
                        "{summary} This is additional content for the news article \
                         providing more detailed analysis and context."
                    ),
                    summary,
                    published_at: now - Duration::days(i as i64 + 1),
                },
                sentiment_score: score,
            })
            .collect()
    }

    /// Overview metadata for the demo symbols, generic otherwise.
    pub fn overview(symbol: &str) -> ExternalOverview {
        let (name, sector, industry, market_cap) = match symbol {
            "AAPL" => (
                "Apple Inc.",
                "Technology",
                "Consumer Electronics",
                3_000_000_000_000_i64,
            ),
            "TSLA" => (
                "Tesla Inc.",
                "Consumer Cyclical",
                "Auto Manufacturers",
                800_000_000_000,
            ),
            "GOOGL" => (
                "Alphabet Inc.",
                "Communication Services",
                "Internet Content & Information",
                1_700_000_000_000,
            ),
            "MSFT" => (
                "Microsoft Corporation",
                "Technology",
                "Software—Infrastructure",
                2_800_000_000_000,
            ),
            "AMZN" => (
                "Amazon.com Inc.",
                "Consumer Cyclical",
                "Internet Retail",
                1_500_000_000_000,
            ),
            _ => {
                return ExternalOverview {
                    name: format!("{symbol} Corporation"),
                    sector: "Technology".to_string(),
                    industry: "Software".to_string(),
                    market_cap: 1_000_000_000_000,
                }
            }
        };

        ExternalOverview {
            name: name.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
            market_cap,
        }
    }
}
