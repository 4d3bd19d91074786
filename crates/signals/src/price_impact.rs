//! Price-impact estimation.
//!
//! Looks up the historical (commodity, event type) calibration table, falls
//! back to a commodity-level default range on a miss — the report always
//! needs a value, so a miss reduces confidence instead of failing — and
//! blends a daily per-commodity confidence from article count, sentiment
//! consistency, source quality, peak alert tier and macro alignment.

use crate::scorer::alert_ordering;
use grainflow_core::{
    AlertSet, AlertTier, ArticleRecord, Commodity, EngineError, EventType, ImpactConfig,
    PriceImpactEstimate, Result, Sentiment, SignalScore,
};
use std::collections::HashMap;

/// A calibrated move range with its sample confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRange {
    /// Low move magnitude, percent.
    pub low: f64,
    /// High move magnitude, percent.
    pub high: f64,
    /// Sample confidence in [0, 1].
    pub confidence: f64,
}

/// Result of a calibration lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationHit {
    /// The move range to use.
    pub range: MoveRange,
    /// True if the commodity-level fallback was used.
    pub fallback: bool,
}

/// Calibration lookup table, built once per run from the configuration
/// and immutable afterwards.
#[derive(Debug, Clone)]
pub struct CalibrationTable {
    entries: HashMap<(Commodity, EventType), MoveRange>,
    defaults: HashMap<Commodity, MoveRange>,
    fallback_scale: f64,
}

impl CalibrationTable {
    /// Builds the lookup table from the impact configuration.
    #[must_use]
    pub fn from_config(config: &ImpactConfig) -> Self {
        let entries = config
            .calibration
            .iter()
            .map(|e| {
                (
                    (e.commodity, e.event_type),
                    MoveRange {
                        low: e.move_low,
                        high: e.move_high,
                        confidence: e.confidence,
                    },
                )
            })
            .collect();
        let defaults = config
            .commodity_defaults
            .iter()
            .map(|e| {
                (
                    e.commodity,
                    MoveRange {
                        low: e.move_low,
                        high: e.move_high,
                        confidence: e.confidence,
                    },
                )
            })
            .collect();
        Self {
            entries,
            defaults,
            fallback_scale: config.fallback_confidence_scale,
        }
    }

    /// Looks up the move range for a pair, falling back on a miss.
    ///
    /// A miss is recovered internally: the commodity default applies with
    /// its confidence scaled down, and a pair with no default at all gets a
    /// zero range with zero confidence rather than an error.
    #[must_use]
    pub fn lookup(&self, commodity: Commodity, event_type: EventType) -> CalibrationHit {
        if let Some(range) = self.entries.get(&(commodity, event_type)) {
            return CalibrationHit {
                range: *range,
                fallback: false,
            };
        }

        let miss = EngineError::calibration_miss(commodity, event_type);
        tracing::debug!(error = %miss, "falling back to commodity default range");

        match self.defaults.get(&commodity) {
            Some(range) => CalibrationHit {
                range: MoveRange {
                    confidence: range.confidence * self.fallback_scale,
                    ..*range
                },
                fallback: true,
            },
            None => {
                tracing::warn!(%commodity, %event_type, "no fallback range configured");
                CalibrationHit {
                    range: MoveRange {
                        low: 0.0,
                        high: 0.0,
                        confidence: 0.0,
                    },
                    fallback: true,
                }
            }
        }
    }
}

/// Estimates the expected price move for one scored article.
///
/// The calibrated magnitude range is scaled by sentiment strength and
/// signed by sentiment direction; a neutral article carries no directional
/// expectation and yields a flat range.
///
/// # Errors
/// Returns `InvariantViolation` if the resulting range is inverted, which
/// the sign handling rules out short of a bug.
pub fn estimate(
    commodity: Commodity,
    event_type: EventType,
    sentiment: Sentiment,
    sentiment_strength: f64,
    table: &CalibrationTable,
) -> Result<PriceImpactEstimate> {
    let hit = table.lookup(commodity, event_type);
    let s = sentiment_strength;

    let (low, high) = match sentiment {
        Sentiment::Bullish => (hit.range.low * s, hit.range.high * s),
        Sentiment::Bearish => (-hit.range.high * s, -hit.range.low * s),
        Sentiment::Neutral => (0.0, 0.0),
    };

    PriceImpactEstimate::new(commodity, event_type, low, high, hit.range.confidence)
}

/// Daily per-commodity estimate for the report.
///
/// The day's top-ranked article for the commodity supplies event type and
/// sentiment; confidence blends the calibration confidence with the daily
/// reliability of that commodity's coverage. Returns `None` when the day
/// has no scored articles for the commodity.
///
/// # Errors
/// Propagates `InvariantViolation` from estimate construction.
pub fn daily_estimate(
    commodity: Commodity,
    articles: &[ArticleRecord],
    scores: &[SignalScore],
    alerts: &AlertSet,
    macro_composite: f64,
    table: &CalibrationTable,
    config: &ImpactConfig,
) -> Result<Option<PriceImpactEstimate>> {
    let by_id: HashMap<&str, &ArticleRecord> = articles
        .iter()
        .filter(|a| a.commodity == commodity)
        .map(|a| (a.id.as_str(), a))
        .collect();

    let mut commodity_scores: Vec<&SignalScore> = scores
        .iter()
        .filter(|s| by_id.contains_key(s.article_id.as_str()))
        .collect();
    if commodity_scores.is_empty() {
        return Ok(None);
    }
    commodity_scores.sort_by(|a, b| alert_ordering(a, b));

    let top = commodity_scores[0];
    let article = by_id[top.article_id.as_str()];

    let base = estimate(
        commodity,
        article.event_type,
        article.sentiment,
        article.sentiment_strength,
        table,
    )?;

    let blend = daily_confidence(commodity, articles, alerts, macro_composite, config);
    let confidence = round3((base.confidence * blend).clamp(0.0, 1.0));

    Ok(Some(PriceImpactEstimate::new(
        commodity,
        base.event_type,
        base.expected_move_low,
        base.expected_move_high,
        confidence,
    )?))
}

/// Reliability of a day's coverage for one commodity, in [0, 1].
///
/// Blends five components with the configured weights: article count
/// (saturating), sentiment consistency, average source quality, peak alert
/// tier, and alignment between the day's net sentiment and the macro risk
/// level.
#[must_use]
pub fn daily_confidence(
    commodity: Commodity,
    articles: &[ArticleRecord],
    alerts: &AlertSet,
    macro_composite: f64,
    config: &ImpactConfig,
) -> f64 {
    let rows: Vec<&ArticleRecord> = articles
        .iter()
        .filter(|a| a.commodity == commodity)
        .collect();
    if rows.is_empty() {
        return 0.0;
    }

    let count_score =
        (rows.len() as f64 / config.confidence_count_saturation as f64).min(1.0);

    let consistency = sentiment_consistency(&rows);

    let quality: f64 = rows
        .iter()
        .map(|a| source_quality(a.url.as_deref()))
        .sum::<f64>()
        / rows.len() as f64;

    let alert_component = match alerts.highest_tier_for(commodity) {
        Some(AlertTier::Critical) => 1.0,
        Some(AlertTier::Watch) => 0.6,
        _ => 0.0,
    };

    let net_sentiment: f64 = rows.iter().map(|a| a.sentiment.sign()).sum();
    // Macro risk is an unsigned 0-5 index: elevated risk historically
    // coincides with supply shocks, which are price-bullish for grains.
    let alignment = if macro_composite < 1.0 || net_sentiment == 0.0 {
        0.5
    } else if net_sentiment > 0.0 {
        1.0
    } else {
        0.0
    };

    let w = &config.confidence;
    let confidence = w.article_count * count_score
        + w.sentiment_consistency * consistency
        + w.source_quality * quality
        + w.alert_severity * alert_component
        + w.macro_alignment * alignment;

    round3(confidence.clamp(0.0, 1.0))
}

/// Sentiment coherence of a day's articles: one directional reading is
/// fully coherent, an all-neutral day is barely usable, and a three-way
/// split carries no signal.
fn sentiment_consistency(rows: &[&ArticleRecord]) -> f64 {
    let mut kinds: Vec<Sentiment> = rows.iter().map(|a| a.sentiment).collect();
    kinds.sort_by_key(|s| s.as_str());
    kinds.dedup();

    match kinds.as_slice() {
        [Sentiment::Neutral] => 0.3,
        [_] => 1.0,
        [_, _] => 0.5,
        _ => 0.0,
    }
}

/// Source quality tier from the article URL.
fn source_quality(url: Option<&str>) -> f64 {
    const TOP_TIER: &[&str] = &[
        "usda.gov",
        "fao.org",
        "igc.int",
        "ers.usda",
        "ec.europa.eu",
        "conab.gov.br",
        "noaa.gov",
        "ecmwf.int",
        "droughtmonitor.unl.edu",
        "climate.gov",
    ];
    const REGIONAL_TIER: &[&str] = &[
        ".gov",
        ".gouv",
        "agmanager.info",
        "kswheat.com",
        "kansasagconnection",
        "agroinformacion",
        "bolsadecereales",
        "news.agrofy.com.ar",
    ];

    let Some(url) = url else {
        return 0.4;
    };
    let url = url.to_lowercase();

    if TOP_TIER.iter().any(|d| url.contains(d)) {
        1.0
    } else if REGIONAL_TIER.iter().any(|d| url.contains(d)) {
        0.7
    } else if !url.is_empty() {
        0.5
    } else {
        0.4
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use grainflow_core::{Alert, EventType};

    fn table() -> CalibrationTable {
        CalibrationTable::from_config(&ImpactConfig::default())
    }

    fn article(
        id: &str,
        commodity: Commodity,
        event_type: EventType,
        sentiment: Sentiment,
        strength: f64,
        url: Option<&str>,
    ) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            source: "test".to_string(),
            url: url.map(String::from),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap(),
            language: "en".to_string(),
            commodity,
            event_type,
            sentiment,
            sentiment_strength: strength,
            risk_keywords: vec![],
            summary: String::new(),
        }
    }

    fn score(id: &str, severity: f64) -> SignalScore {
        SignalScore::new(id, 0.5, severity, 0.0, vec![]).unwrap()
    }

    // ============================================
    // Calibration Lookup
    // ============================================

    #[test]
    fn calibrated_pair_hits_table() {
        let hit = table().lookup(Commodity::Wheat, EventType::Weather);
        assert!(!hit.fallback);
        assert!((hit.range.low - 0.8).abs() < f64::EPSILON);
        assert!((hit.range.high - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn uncalibrated_pair_falls_back_with_reduced_confidence() {
        // fx is not in the default per-grain calibration set.
        let hit = table().lookup(Commodity::Wheat, EventType::Fx);
        assert!(hit.fallback);
        // Default 0.3 confidence scaled by 0.5.
        assert!((hit.range.confidence - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn commodity_without_defaults_gets_zero_range() {
        let hit = table().lookup(Commodity::Macro, EventType::Weather);
        assert!(hit.fallback);
        assert!(hit.range.high.abs() < f64::EPSILON);
        assert!(hit.range.confidence.abs() < f64::EPSILON);
    }

    // ============================================
    // Per-Article Estimates
    // ============================================

    #[test]
    fn bullish_estimate_is_positive_and_scaled() {
        let est = estimate(
            Commodity::Wheat,
            EventType::Weather,
            Sentiment::Bullish,
            0.5,
            &table(),
        )
        .unwrap();

        assert!((est.expected_move_low - 0.4).abs() < 1e-12);
        assert!((est.expected_move_high - 0.75).abs() < 1e-12);
    }

    #[test]
    fn bearish_estimate_is_negative_with_ordered_bounds() {
        let est = estimate(
            Commodity::Wheat,
            EventType::Weather,
            Sentiment::Bearish,
            1.0,
            &table(),
        )
        .unwrap();

        assert!((est.expected_move_low + 1.5).abs() < 1e-12);
        assert!((est.expected_move_high + 0.8).abs() < 1e-12);
        assert!(est.expected_move_low <= est.expected_move_high);
    }

    #[test]
    fn neutral_estimate_is_flat() {
        let est = estimate(
            Commodity::Corn,
            EventType::Supply,
            Sentiment::Neutral,
            0.9,
            &table(),
        )
        .unwrap();

        assert!(est.expected_move_low.abs() < f64::EPSILON);
        assert!(est.expected_move_high.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_strength_estimate_is_flat() {
        let est = estimate(
            Commodity::Soy,
            EventType::Weather,
            Sentiment::Bullish,
            0.0,
            &table(),
        )
        .unwrap();
        assert!(est.expected_move_high.abs() < f64::EPSILON);
    }

    // ============================================
    // Source Quality
    // ============================================

    #[test]
    fn institutional_sources_rank_top_tier() {
        assert!((source_quality(Some("https://www.usda.gov/wasde")) - 1.0).abs() < f64::EPSILON);
        assert!((source_quality(Some("https://noaa.gov/outlook")) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn regional_sources_rank_mid_tier() {
        assert!(
            (source_quality(Some("https://www.kswheat.com/news")) - 0.7).abs() < f64::EPSILON
        );
    }

    #[test]
    fn generic_and_missing_urls_rank_low() {
        assert!((source_quality(Some("https://example.com/a")) - 0.5).abs() < f64::EPSILON);
        assert!((source_quality(None) - 0.4).abs() < f64::EPSILON);
    }

    // ============================================
    // Daily Confidence
    // ============================================

    #[test]
    fn no_articles_means_zero_confidence() {
        let conf = daily_confidence(
            Commodity::Wheat,
            &[],
            &AlertSet::default(),
            0.0,
            &ImpactConfig::default(),
        );
        assert!(conf.abs() < f64::EPSILON);
    }

    #[test]
    fn consistent_institutional_coverage_scores_high() {
        let articles: Vec<_> = (0..10)
            .map(|i| {
                article(
                    &format!("a{i}"),
                    Commodity::Wheat,
                    EventType::Weather,
                    Sentiment::Bullish,
                    0.8,
                    Some("https://www.usda.gov/report"),
                )
            })
            .collect();
        let alerts = AlertSet {
            active: vec![Alert {
                article_id: "a0".to_string(),
                commodity: Commodity::Wheat,
                event_type: EventType::Weather,
                tier: AlertTier::Critical,
                reason: "test".to_string(),
                triggered_at: Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap(),
            }],
            suppressed: vec![],
        };

        let conf = daily_confidence(
            Commodity::Wheat,
            &articles,
            &alerts,
            3.0,
            &ImpactConfig::default(),
        );

        // All five components at their maximum.
        assert!((conf - 1.0).abs() < 1e-9, "confidence was {conf}");
    }

    #[test]
    fn mixed_sentiment_lowers_confidence() {
        let consistent = vec![
            article("a1", Commodity::Corn, EventType::Demand, Sentiment::Bullish, 0.5, None),
            article("a2", Commodity::Corn, EventType::Demand, Sentiment::Bullish, 0.5, None),
        ];
        let mixed = vec![
            article("a1", Commodity::Corn, EventType::Demand, Sentiment::Bullish, 0.5, None),
            article("a2", Commodity::Corn, EventType::Demand, Sentiment::Bearish, 0.5, None),
        ];
        let config = ImpactConfig::default();

        let high = daily_confidence(Commodity::Corn, &consistent, &AlertSet::default(), 0.0, &config);
        let low = daily_confidence(Commodity::Corn, &mixed, &AlertSet::default(), 0.0, &config);
        assert!(high > low);
    }

    #[test]
    fn contrarian_sentiment_in_risk_environment_scores_zero_alignment() {
        let bearish = vec![article(
            "a1",
            Commodity::Soy,
            EventType::Weather,
            Sentiment::Bearish,
            0.8,
            None,
        )];
        let bullish = vec![article(
            "a1",
            Commodity::Soy,
            EventType::Weather,
            Sentiment::Bullish,
            0.8,
            None,
        )];
        let config = ImpactConfig::default();

        let contrarian =
            daily_confidence(Commodity::Soy, &bearish, &AlertSet::default(), 3.0, &config);
        let aligned =
            daily_confidence(Commodity::Soy, &bullish, &AlertSet::default(), 3.0, &config);
        assert!(aligned > contrarian);
    }

    // ============================================
    // Daily Estimate
    // ============================================

    #[test]
    fn daily_estimate_uses_top_ranked_article() {
        let articles = vec![
            article("a1", Commodity::Wheat, EventType::Demand, Sentiment::Bullish, 0.3, None),
            article("a2", Commodity::Wheat, EventType::Weather, Sentiment::Bearish, 0.9, None),
        ];
        let scores = vec![score("a1", 0.2), score("a2", 0.9)];

        let est = daily_estimate(
            Commodity::Wheat,
            &articles,
            &scores,
            &AlertSet::default(),
            0.0,
            &table(),
            &ImpactConfig::default(),
        )
        .unwrap()
        .unwrap();

        // Driven by a2: weather, bearish.
        assert_eq!(est.event_type, EventType::Weather);
        assert!(est.expected_move_low < 0.0);
    }

    #[test]
    fn daily_estimate_none_without_articles() {
        let result = daily_estimate(
            Commodity::Soy,
            &[],
            &[],
            &AlertSet::default(),
            0.0,
            &table(),
            &ImpactConfig::default(),
        )
        .unwrap();
        assert!(result.is_none());
    }
}
