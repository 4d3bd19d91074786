//! Sentiment and severity scoring.
//!
//! Converts a validated `ArticleRecord` into its per-article numeric
//! scores:
//!
//! - `sentiment_score = sentiment_strength * sign(sentiment)`
//! - `severity_score = min(cap, base(event_type) * strength + boost * matched)`
//! - `weighted_keyword_score = min(1, matched_weight / saturation)`
//!
//! All three are bounded by construction; `SignalScore::new` re-checks the
//! bounds and treats a violation as an internal error.

use crate::keywords::{KeywordHit, KeywordMatcher};
use grainflow_core::{ArticleRecord, Result, ScoringConfig, SignalScore};
use std::cmp::Ordering;

/// Scores one article.
///
/// # Errors
/// Returns `InvariantViolation` if a computed score lands outside its
/// range, which indicates a configuration or scoring bug rather than bad
/// input.
pub fn score_article(
    article: &ArticleRecord,
    matcher: &KeywordMatcher,
    config: &ScoringConfig,
) -> Result<SignalScore> {
    let hits = matcher.matches(article);
    score_with_hits(article, &hits, config)
}

/// Scores one article with precomputed keyword hits.
///
/// # Errors
/// Same as [`score_article`].
pub fn score_with_hits(
    article: &ArticleRecord,
    hits: &[KeywordHit],
    config: &ScoringConfig,
) -> Result<SignalScore> {
    let sentiment_score = article.sentiment_strength * article.sentiment.sign();

    let base = config.event_base.base_for(article.event_type);
    let boosted = base * article.sentiment_strength + config.keyword_boost * hits.len() as f64;
    let severity_score = boosted.min(config.severity_cap);

    let weighted_keyword_score =
        (KeywordMatcher::total_weight(hits) / config.keyword_weight_saturation).min(1.0);

    SignalScore::new(
        &article.id,
        sentiment_score,
        severity_score,
        weighted_keyword_score,
        hits.iter().map(|h| h.term.clone()).collect(),
    )
}

/// Total order used for downstream alerting.
///
/// Higher severity ranks first; ties break on matched-keyword count, then
/// on article id so the order is deterministic for identical scores.
#[must_use]
pub fn alert_ordering(a: &SignalScore, b: &SignalScore) -> Ordering {
    b.severity_score
        .partial_cmp(&a.severity_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.matched_count().cmp(&a.matched_count()))
        .then_with(|| a.article_id.cmp(&b.article_id))
}
