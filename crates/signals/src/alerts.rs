//! Early-warning alert engine.
//!
//! Assigns each scored article a terminal tier for the run and collapses
//! articles that describe the same underlying event into the single
//! highest-tier alert. Suppressed duplicates are kept for audit, not
//! deleted. Alert creation is pure; notification delivery belongs to an
//! external collaborator.

use crate::scorer::alert_ordering;
use chrono::NaiveDate;
use grainflow_core::{
    Alert, AlertConfig, AlertSet, AlertTier, ArticleRecord, Commodity, EventType, SignalScore,
    SuppressedAlert,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Assigns the alert tier for one scored article.
///
/// Rules are evaluated in order, first match wins:
/// 1. severity >= critical, or combo-many keywords with combo severity -> CRITICAL
/// 2. severity >= watch, or any trigger keyword -> WATCH
/// 3. otherwise -> INFO
#[must_use]
pub fn assign_tier(score: &SignalScore, config: &AlertConfig) -> AlertTier {
    let matched = score.matched_count();

    if score.severity_score >= config.critical_severity
        || (matched >= config.critical_combo_keywords
            && score.severity_score >= config.critical_combo_severity)
    {
        AlertTier::Critical
    } else if score.severity_score >= config.watch_severity || matched >= config.watch_keywords {
        AlertTier::Watch
    } else {
        AlertTier::Info
    }
}

/// Evaluates the day's batch into active and suppressed alerts.
///
/// Articles are paired with their scores by id; an article without a score
/// (or vice versa) is ignored. The active list is ordered most severe
/// first, ties broken by the deterministic alerting order.
#[must_use]
pub fn evaluate(
    articles: &[ArticleRecord],
    scores: &[SignalScore],
    config: &AlertConfig,
) -> AlertSet {
    let mut by_id: BTreeMap<&str, &ArticleRecord> =
        articles.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut entries: Vec<(&ArticleRecord, &SignalScore, Alert)> = Vec::new();
    for score in scores {
        let Some(article) = by_id.remove(score.article_id.as_str()) else {
            continue;
        };
        let tier = assign_tier(score, config);
        let alert = Alert {
            article_id: article.id.clone(),
            commodity: article.commodity,
            event_type: article.event_type,
            tier,
            reason: tier_reason(score),
            triggered_at: article.timestamp,
        };
        entries.push((article, score, alert));
    }

    // Group by the underlying-event key; the tuple key keeps group
    // iteration deterministic.
    let mut groups: BTreeMap<(Commodity, EventType, NaiveDate), Vec<usize>> = BTreeMap::new();
    for (idx, (article, _, _)) in entries.iter().enumerate() {
        groups
            .entry((article.commodity, article.event_type, article.date()))
            .or_default()
            .push(idx);
    }

    let mut active: Vec<Alert> = Vec::new();
    let mut suppressed: Vec<SuppressedAlert> = Vec::new();

    for indices in groups.values() {
        let mut ordered = indices.clone();
        ordered.sort_by(|&a, &b| group_rank(&entries[a], &entries[b]));

        // Greedy clustering: each article joins the first surviving alert
        // whose summary it sufficiently overlaps, otherwise survives itself.
        let mut survivors: Vec<usize> = Vec::new();
        for idx in ordered {
            let summary = &entries[idx].0.summary;
            match survivors.iter().find(|&&s| {
                summary_similarity(&entries[s].0.summary, summary) >= config.dedup_similarity
            }) {
                Some(&survivor) => {
                    let survivor_id = entries[survivor].2.article_id.clone();
                    tracing::debug!(
                        article_id = %entries[idx].2.article_id,
                        suppressed_by = %survivor_id,
                        "suppressing duplicate alert"
                    );
                    suppressed.push(SuppressedAlert {
                        alert: entries[idx].2.clone(),
                        suppressed_by: survivor_id,
                    });
                }
                None => survivors.push(idx),
            }
        }

        active.extend(survivors.into_iter().map(|idx| entries[idx].2.clone()));
    }

    let score_by_id: BTreeMap<&str, &SignalScore> = entries
        .iter()
        .map(|(_, score, alert)| (alert.article_id.as_str(), *score))
        .collect();
    active.sort_by(|a, b| {
        b.tier.cmp(&a.tier).then_with(|| {
            match (
                score_by_id.get(a.article_id.as_str()),
                score_by_id.get(b.article_id.as_str()),
            ) {
                (Some(sa), Some(sb)) => alert_ordering(sa, sb),
                _ => Ordering::Equal,
            }
        })
    });

    AlertSet { active, suppressed }
}

/// Ranks duplicates inside a group: higher tier survives; within a tier
/// the deterministic alerting order decides.
fn group_rank(
    a: &(&ArticleRecord, &SignalScore, Alert),
    b: &(&ArticleRecord, &SignalScore, Alert),
) -> Ordering {
    b.2.tier
        .cmp(&a.2.tier)
        .then_with(|| alert_ordering(a.1, b.1))
}

/// Jaccard overlap between the word-token sets of two summaries.
///
/// Two empty summaries count as identical: with the same commodity, event
/// type and date there is nothing left to distinguish them.
#[must_use]
pub fn summary_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn tier_reason(score: &SignalScore) -> String {
    if score.matched_keywords.is_empty() {
        format!("severity {:.2}, no trigger keywords", score.severity_score)
    } else {
        format!(
            "severity {:.2}, {} trigger keyword(s): {}",
            score.severity_score,
            score.matched_count(),
            score.matched_keywords.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use grainflow_core::Sentiment;

    fn article(id: &str, commodity: Commodity, event_type: EventType, summary: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            source: "test".to_string(),
            url: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap(),
            language: "en".to_string(),
            commodity,
            event_type,
            sentiment: Sentiment::Bearish,
            sentiment_strength: 0.8,
            risk_keywords: vec![],
            summary: summary.to_string(),
        }
    }

    fn score(id: &str, severity: f64, keywords: Vec<&str>) -> SignalScore {
        SignalScore::new(
            id,
            -0.5,
            severity,
            0.3,
            keywords.into_iter().map(String::from).collect(),
        )
        .unwrap()
    }

    // ============================================
    // Tier Assignment
    // ============================================

    #[test]
    fn high_severity_is_critical() {
        let tier = assign_tier(&score("a1", 0.8, vec![]), &AlertConfig::default());
        assert_eq!(tier, AlertTier::Critical);
    }

    #[test]
    fn keyword_combo_is_critical() {
        let tier = assign_tier(
            &score("a1", 0.55, vec!["frost", "drought"]),
            &AlertConfig::default(),
        );
        assert_eq!(tier, AlertTier::Critical);
    }

    #[test]
    fn combo_needs_both_keywords_and_severity() {
        // Two keywords but severity below the combo floor: WATCH, not CRITICAL.
        let tier = assign_tier(
            &score("a1", 0.45, vec!["frost", "drought"]),
            &AlertConfig::default(),
        );
        assert_eq!(tier, AlertTier::Watch);
    }

    #[test]
    fn moderate_severity_is_watch() {
        let tier = assign_tier(&score("a1", 0.45, vec![]), &AlertConfig::default());
        assert_eq!(tier, AlertTier::Watch);
    }

    #[test]
    fn single_keyword_is_watch_even_at_low_severity() {
        let tier = assign_tier(&score("a1", 0.1, vec!["frost"]), &AlertConfig::default());
        assert_eq!(tier, AlertTier::Watch);
    }

    #[test]
    fn quiet_article_is_info() {
        let tier = assign_tier(&score("a1", 0.08, vec![]), &AlertConfig::default());
        assert_eq!(tier, AlertTier::Info);
    }

    #[test]
    fn tier_monotonic_in_severity_for_fixed_keywords() {
        let config = AlertConfig::default();
        for keywords in [vec![], vec!["frost"], vec!["frost", "drought"]] {
            let mut last = AlertTier::Info;
            for step in 0..=20 {
                let severity = f64::from(step) / 20.0;
                let tier = assign_tier(&score("a1", severity, keywords.clone()), &config);
                assert!(
                    tier >= last,
                    "tier dropped from {last} to {tier} at severity {severity} with {} keywords",
                    keywords.len()
                );
                last = tier;
            }
        }
    }

    // ============================================
    // End-to-End Scenarios
    // ============================================

    #[test]
    fn frost_drought_wheat_article_goes_critical() {
        // severity >= 0.75 from the scorer for this scenario.
        let articles = vec![article(
            "a1",
            Commodity::Wheat,
            EventType::Weather,
            "Frost and drought threaten winter wheat",
        )];
        let scores = vec![score("a1", 1.0, vec!["frost", "drought"])];

        let set = evaluate(&articles, &scores, &AlertConfig::default());
        assert_eq!(set.active.len(), 1);
        assert_eq!(set.active[0].tier, AlertTier::Critical);
        assert!(set.active[0].reason.contains("frost"));
    }

    #[test]
    fn quiet_corn_demand_article_goes_info() {
        let articles = vec![article(
            "a1",
            Commodity::Corn,
            EventType::Demand,
            "Weekly ethanol grind unchanged",
        )];
        let scores = vec![score("a1", 0.08, vec![])];

        let set = evaluate(&articles, &scores, &AlertConfig::default());
        assert_eq!(set.active[0].tier, AlertTier::Info);
    }

    // ============================================
    // Deduplication
    // ============================================

    #[test]
    fn duplicate_event_collapses_to_highest_tier() {
        let articles = vec![
            article(
                "a1",
                Commodity::Wheat,
                EventType::Weather,
                "Severe frost damages wheat crop in Kansas",
            ),
            article(
                "a2",
                Commodity::Wheat,
                EventType::Weather,
                "Frost damages wheat crop across Kansas",
            ),
        ];
        let scores = vec![
            score("a1", 0.5, vec!["frost"]),
            score("a2", 0.9, vec!["frost"]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());

        assert_eq!(set.active.len(), 1);
        assert_eq!(set.active[0].article_id, "a2");
        assert_eq!(set.active[0].tier, AlertTier::Critical);
        assert_eq!(set.suppressed.len(), 1);
        assert_eq!(set.suppressed[0].alert.article_id, "a1");
        assert_eq!(set.suppressed[0].suppressed_by, "a2");
    }

    #[test]
    fn higher_tier_survives_even_at_lower_severity() {
        // a1: severity 0.74 with two keywords -> CRITICAL via the combo rule.
        // a2: severity 0.745, no keywords -> WATCH. The CRITICAL one survives.
        let articles = vec![
            article(
                "a1",
                Commodity::Wheat,
                EventType::Weather,
                "Frost and drought hit the wheat belt",
            ),
            article(
                "a2",
                Commodity::Wheat,
                EventType::Weather,
                "Frost and drought hit the wheat belt again",
            ),
        ];
        let scores = vec![
            score("a1", 0.74, vec!["frost", "drought"]),
            score("a2", 0.745, vec![]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());

        assert_eq!(set.active.len(), 1);
        assert_eq!(set.active[0].article_id, "a1");
        assert_eq!(set.active[0].tier, AlertTier::Critical);
    }

    #[test]
    fn dissimilar_summaries_both_survive() {
        let articles = vec![
            article(
                "a1",
                Commodity::Wheat,
                EventType::Weather,
                "Severe frost strikes the Kansas wheat belt overnight",
            ),
            article(
                "a2",
                Commodity::Wheat,
                EventType::Weather,
                "Monsoon rains delay harvest operations in Punjab",
            ),
        ];
        let scores = vec![
            score("a1", 0.8, vec!["frost"]),
            score("a2", 0.6, vec![]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());
        assert_eq!(set.active.len(), 2);
        assert!(set.suppressed.is_empty());
    }

    #[test]
    fn different_commodity_never_dedups() {
        let articles = vec![
            article("a1", Commodity::Wheat, EventType::Weather, "Frost damage"),
            article("a2", Commodity::Corn, EventType::Weather, "Frost damage"),
        ];
        let scores = vec![
            score("a1", 0.8, vec!["frost"]),
            score("a2", 0.8, vec!["frost"]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());
        assert_eq!(set.active.len(), 2);
    }

    #[test]
    fn different_date_never_dedups() {
        let mut later = article("a2", Commodity::Wheat, EventType::Weather, "Frost damage");
        later.timestamp = later.timestamp + Duration::days(1);
        let articles = vec![
            article("a1", Commodity::Wheat, EventType::Weather, "Frost damage"),
            later,
        ];
        let scores = vec![
            score("a1", 0.8, vec!["frost"]),
            score("a2", 0.8, vec!["frost"]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());
        assert_eq!(set.active.len(), 2);
    }

    // ============================================
    // Ordering & Empty Input
    // ============================================

    #[test]
    fn active_alerts_ordered_most_severe_first() {
        let articles = vec![
            article("a1", Commodity::Corn, EventType::Demand, "Quiet demand note"),
            article("a2", Commodity::Wheat, EventType::Weather, "Severe frost event"),
            article("a3", Commodity::Soy, EventType::Logistics, "Port strike begins"),
        ];
        let scores = vec![
            score("a1", 0.1, vec![]),
            score("a2", 0.9, vec!["frost"]),
            score("a3", 0.45, vec!["strike"]),
        ];

        let set = evaluate(&articles, &scores, &AlertConfig::default());

        let tiers: Vec<_> = set.active.iter().map(|a| a.tier).collect();
        assert_eq!(
            tiers,
            vec![AlertTier::Critical, AlertTier::Watch, AlertTier::Info]
        );
    }

    #[test]
    fn empty_batch_yields_empty_set() {
        let set = evaluate(&[], &[], &AlertConfig::default());
        assert!(set.active.is_empty());
        assert!(set.suppressed.is_empty());
    }

    // ============================================
    // Similarity Heuristic
    // ============================================

    #[test]
    fn identical_summaries_fully_overlap() {
        assert!((summary_similarity("Frost hits wheat", "Frost hits wheat") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_summaries_do_not_overlap() {
        assert!(summary_similarity("frost kansas wheat", "rain punjab harvest") < f64::EPSILON);
    }

    #[test]
    fn similarity_ignores_case_and_punctuation() {
        let sim = summary_similarity("Frost, hits wheat!", "frost hits WHEAT");
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_summaries_count_as_identical() {
        assert!((summary_similarity("", "") - 1.0).abs() < 1e-12);
    }
}
