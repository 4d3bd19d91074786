//! Daily pipeline orchestration.
//!
//! Normalizes and scores the day's batch with bounded concurrency, joins,
//! and then runs the sequential aggregation stages: macro indicator, alert
//! evaluation and deduplication, and per-commodity price impact. The
//! aggregate stages require the full day's article set, so nothing runs
//! past the join until every article has settled.

use crate::keywords::KeywordMatcher;
use crate::price_impact::{self, CalibrationTable};
use crate::{alerts, macro_indicator, normalizer, scorer};
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use grainflow_core::{
    AlertSet, ArticleRecord, Commodity, DailySignal, EngineConfig, EngineError, MacroIndicator,
    PriceImpactEstimate, RawExtraction, SignalScore,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a daily run hands to the report and persistence collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct DailyOutputs {
    /// Run date.
    pub date: NaiveDate,
    /// Daily macro-grains indicator.
    pub indicator: MacroIndicator,
    /// Active and suppressed alerts, most severe first.
    pub alerts: AlertSet,
    /// Price-impact estimate per grain commodity with coverage that day.
    pub impacts: BTreeMap<Commodity, PriceImpactEstimate>,
    /// Net daily signals for the backtest history.
    pub signals: Vec<DailySignal>,
    /// Articles that survived validation.
    pub article_count: usize,
    /// Articles dropped by validation.
    pub rejected_count: usize,
}

/// Runs the full daily pipeline over one batch of raw extractions.
///
/// Per-article work (normalize, score) runs concurrently up to
/// `config.pipeline.max_concurrency`; results are joined in input order
/// before any aggregation. An empty or fully rejected batch still yields a
/// valid, empty result.
///
/// # Errors
/// Returns an error only for invariant violations (scorer bugs).
/// Validation failures drop the affected article and the run continues.
pub async fn run_daily(
    raws: Vec<RawExtraction>,
    date: NaiveDate,
    config: &EngineConfig,
) -> anyhow::Result<DailyOutputs> {
    let matcher = KeywordMatcher::from_config(&config.keywords);

    // buffered (not buffer_unordered) keeps completion in input order, so
    // the whole run is deterministic for a frozen batch.
    let results: Vec<Result<(ArticleRecord, SignalScore), EngineError>> = stream::iter(raws)
        .map(|raw| {
            let matcher = &matcher;
            let scoring = &config.scoring;
            async move {
                let record = normalizer::normalize(&raw)?;
                let score = scorer::score_article(&record, matcher, scoring)?;
                Ok((record, score))
            }
        })
        .buffered(config.pipeline.max_concurrency.max(1))
        .collect()
        .await;

    let mut articles: Vec<ArticleRecord> = Vec::new();
    let mut scores: Vec<SignalScore> = Vec::new();
    let mut rejected_count = 0usize;

    for result in results {
        match result {
            Ok((article, score)) => {
                articles.push(article);
                scores.push(score);
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(error = %err, "dropping article");
                rejected_count += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let indicator = macro_indicator::aggregate(date, &articles, &scores, &config.macro_indicator)?;
    let alert_set = alerts::evaluate(&articles, &scores, &config.alerts);

    let table = CalibrationTable::from_config(&config.impact);
    let mut impacts = BTreeMap::new();
    for commodity in Commodity::grains() {
        if let Some(estimate) = price_impact::daily_estimate(
            commodity,
            &articles,
            &scores,
            &alert_set,
            indicator.composite,
            &table,
            &config.impact,
        )? {
            impacts.insert(commodity, estimate);
        }
    }

    let signals = daily_signals(date, &articles, &scores);

    tracing::info!(
        %date,
        articles = articles.len(),
        rejected = rejected_count,
        alerts = alert_set.active.len(),
        composite = indicator.composite,
        "daily pipeline complete"
    );

    Ok(DailyOutputs {
        date,
        indicator,
        alerts: alert_set,
        impacts,
        signals,
        article_count: articles.len(),
        rejected_count,
    })
}

/// Derives the day's net directional signal per grain commodity.
///
/// Sums the signed sentiment scores of the date's articles; commodities
/// with no coverage that day produce no signal.
#[must_use]
pub fn daily_signals(
    date: NaiveDate,
    articles: &[ArticleRecord],
    scores: &[SignalScore],
) -> Vec<DailySignal> {
    let by_id: BTreeMap<&str, &SignalScore> = scores
        .iter()
        .map(|s| (s.article_id.as_str(), s))
        .collect();

    let mut net: BTreeMap<Commodity, f64> = BTreeMap::new();
    for article in articles {
        if article.commodity == Commodity::Macro || article.date() != date {
            continue;
        }
        let Some(score) = by_id.get(article.id.as_str()) else {
            continue;
        };
        *net.entry(article.commodity).or_insert(0.0) += score.sentiment_score;
    }

    net.into_iter()
        .map(|(commodity, net_score)| DailySignal::from_net_score(date, commodity, net_score))
        .collect()
}
