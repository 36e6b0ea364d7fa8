use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Action, IndicatorSnapshot, Recommendation, RiskLevel, SentimentSnapshot};

pub const MODEL_VERSION: &str = "2.0-enhanced";

/// Fallback close used when no price bar exists for the symbol. A call
/// produced from this is a degenerate placeholder, not a price view.
const FALLBACK_PRICE: f64 = 100.0;

/// No fundamental data source feeds the model; the weight column is a
/// fixed placeholder kept for schema compatibility.
const FUNDAMENTAL_WEIGHT: f64 = 50.0;

const SENTIMENT_BLEND: f64 = 0.6;
const TECHNICAL_BLEND: f64 = 0.4;
const DECISION_THRESHOLD: f64 = 0.2;

/// Combine the latest sentiment and technical signals into a call.
///
/// Missing inputs degrade to neutral: no sentiment snapshot scores 0,
/// no indicator snapshot contributes nothing, a missing RSI reads as 50.
pub fn recommend(
    symbol: &str,
    date: NaiveDate,
    sentiment: Option<&SentimentSnapshot>,
    technical: Option<&IndicatorSnapshot>,
    latest_close: Option<f64>,
) -> Recommendation {
    let sentiment_score = sentiment.map(|s| s.overall_sentiment).unwrap_or(0.0);
    let technical_score = technical.map(technical_component).unwrap_or(0.0);

    let combined = SENTIMENT_BLEND * sentiment_score + TECHNICAL_BLEND * technical_score;

    let (action, confidence, risk_level) = if combined > DECISION_THRESHOLD {
        let risk = if combined > 0.4 {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        };
        (Action::Buy, (60.0 + combined.abs() * 100.0).min(90.0), risk)
    } else if combined < -DECISION_THRESHOLD {
        (
            Action::Sell,
            (60.0 + combined.abs() * 100.0).min(90.0),
            RiskLevel::High,
        )
    } else {
        (Action::Hold, 50.0 + combined.abs() * 50.0, RiskLevel::Medium)
    };

    let current_price = latest_close.unwrap_or(FALLBACK_PRICE);
    let target_price = match action {
        Action::Buy => current_price * (1.0 + combined.max(0.05)),
        Action::Sell => current_price * (1.0 + combined.min(-0.05)),
        Action::Hold => current_price,
    };

    Recommendation {
        id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        date,
        action,
        confidence: confidence.clamp(0.0, 100.0),
        sentiment_weight: sentiment_score * 100.0,
        technical_weight: technical_score * 100.0,
        fundamental_weight: FUNDAMENTAL_WEIGHT,
        risk_level,
        target_price,
        model_version: MODEL_VERSION.to_string(),
    }
}

/// RSI extremes and the SMA20/SMA50 cross, scored as in the scoring
/// model: oversold +0.3, overbought -0.3, uptrend +0.2 else -0.2.
fn technical_component(snapshot: &IndicatorSnapshot) -> f64 {
    let mut score = 0.0;

    let rsi = snapshot.rsi.unwrap_or(50.0);
    if rsi < 30.0 {
        score += 0.3;
    } else if rsi > 70.0 {
        score -= 0.3;
    }

    if let (Some(sma_20), Some(sma_50)) = (snapshot.sma_20, snapshot.sma_50) {
        if sma_20 > sma_50 {
            score += 0.2;
        } else {
            score -= 0.2;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn sentiment(overall: f64) -> SentimentSnapshot {
        SentimentSnapshot {
            id: Uuid::new_v4(),
            symbol: "TEST".into(),
            date: date(),
            news_sentiment: overall,
            social_sentiment: overall * 0.8,
            overall_sentiment: overall,
            news_mention_count: 3,
            social_mention_count: 30,
            trending_keywords: vec![],
        }
    }

    fn indicators(rsi: Option<f64>, sma_20: Option<f64>, sma_50: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            id: Uuid::new_v4(),
            symbol: "TEST".into(),
            date: date(),
            rsi,
            sma_20,
            sma_50,
            sma_200: None,
            ema_12: None,
            ema_26: None,
            macd: None,
            macd_signal: None,
            bollinger_upper: None,
            bollinger_lower: None,
        }
    }

    #[test]
    fn test_combined_half_is_strong_buy() {
        // sentiment 0.5, technical (oversold + uptrend) 0.5:
        // combined = 0.6*0.5 + 0.4*0.5 = 0.5
        let s = sentiment(0.5);
        let t = indicators(Some(25.0), Some(110.0), Some(100.0));
        let rec = recommend("TEST", date(), Some(&s), Some(&t), Some(200.0));

        assert_eq!(rec.action, Action::Buy);
        assert_eq!(rec.confidence, 90.0); // min(90, 60 + 50)
        assert_eq!(rec.risk_level, RiskLevel::Low); // combined > 0.4
        assert!((rec.target_price - 300.0).abs() < 1e-9); // 200 * 1.5
    }

    #[test]
    fn test_buy_floor_on_target_price() {
        // small positive combined still moves the target at least 5%
        let s = sentiment(0.4);
        let rec = recommend("TEST", date(), Some(&s), None, Some(100.0));

        assert_eq!(rec.action, Action::Buy); // combined = 0.24
        assert_eq!(rec.risk_level, RiskLevel::Medium); // 0.24 <= 0.4
        assert!((rec.target_price - 124.0).abs() < 1e-9); // max(0.05, 0.24)
    }

    #[test]
    fn test_sell_path() {
        let s = sentiment(-0.8);
        let t = indicators(Some(75.0), Some(90.0), Some(100.0));
        // combined = 0.6*-0.8 + 0.4*-0.5 = -0.68
        let rec = recommend("TEST", date(), Some(&s), Some(&t), Some(50.0));

        assert_eq!(rec.action, Action::Sell);
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(rec.confidence, 90.0);
        assert!((rec.target_price - 50.0 * (1.0 - 0.68)).abs() < 1e-9);
    }

    #[test]
    fn test_hold_band_is_exclusive_at_thresholds() {
        // combined exactly 0.2 is still a HOLD
        let s = sentiment(0.2 / 0.6);
        let rec = recommend("TEST", date(), Some(&s), None, Some(100.0));
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
        assert!((rec.confidence - 60.0).abs() < 1e-9); // 50 + 0.2*50
        assert_eq!(rec.target_price, 100.0);
    }

    #[test]
    fn test_missing_inputs_degrade_to_neutral_hold() {
        let rec = recommend("TEST", date(), None, None, None);

        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.confidence, 50.0);
        assert_eq!(rec.sentiment_weight, 0.0);
        assert_eq!(rec.technical_weight, 0.0);
        assert_eq!(rec.fundamental_weight, 50.0);
        // documented degenerate fallback price
        assert_eq!(rec.target_price, 100.0);
        assert_eq!(rec.model_version, MODEL_VERSION);
    }

    #[test]
    fn test_missing_rsi_reads_neutral() {
        // only the SMA cross contributes: technical = -0.2
        let t = indicators(None, Some(95.0), Some(100.0));
        let rec = recommend("TEST", date(), None, Some(&t), Some(100.0));

        assert_eq!(rec.action, Action::Hold); // combined = -0.08
        assert!((rec.technical_weight + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_always_clamped() {
        let s = sentiment(1.0);
        let t = indicators(Some(10.0), Some(120.0), Some(100.0));
        let rec = recommend("TEST", date(), Some(&s), Some(&t), Some(10.0));

        assert!(rec.confidence <= 100.0);
        assert!(rec.confidence >= 0.0);
        assert_eq!(rec.confidence, 90.0); // capped
    }
}
