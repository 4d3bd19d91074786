//! Backtest summary statistics.
//!
//! Aggregates joined records per commodity and overall: mean forward
//! return, hit rate, and counts per horizon, split by predicted bias. The
//! summary also flattens to a key/value map for the persistence
//! collaborator.

use crate::evaluator::{BacktestRecord, JoinOutcome, HORIZONS};
use grainflow_core::{Commodity, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for one bias side at one horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasStats {
    /// Signals with this bias evaluated at the horizon.
    pub n: usize,
    /// Mean realized forward return.
    pub mean_return: f64,
    /// Fraction of hits among these signals.
    pub hit_rate: f64,
}

/// Statistics for one horizon over a record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    /// Signals evaluated at this horizon, any bias.
    pub n: usize,
    /// Mean realized forward return over all evaluated signals.
    pub mean_return: f64,
    /// Fraction of hits among directional signals; neutral signals are
    /// excluded from the denominator, not counted as misses.
    pub hit_rate: f64,
    /// Bullish-only split.
    pub bullish: BiasStats,
    /// Bearish-only split.
    pub bearish: BiasStats,
}

/// Aggregate predictive-quality summary of a signal history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Signals that joined a price series.
    pub signal_count: usize,
    /// Signals dropped for lack of a price series.
    pub signals_skipped: usize,
    /// Skipped horizon evaluations, per horizon.
    pub horizon_skipped: BTreeMap<usize, usize>,
    /// Per-horizon statistics over every commodity.
    pub overall: BTreeMap<usize, HorizonStats>,
    /// Per-horizon statistics per commodity.
    pub by_commodity: BTreeMap<Commodity, BTreeMap<usize, HorizonStats>>,
}

impl BacktestSummary {
    /// Builds the summary from a join outcome.
    #[must_use]
    pub fn from_outcome(outcome: &JoinOutcome) -> Self {
        let records: Vec<&BacktestRecord> = outcome.records.iter().collect();

        let mut by_commodity: BTreeMap<Commodity, BTreeMap<usize, HorizonStats>> = BTreeMap::new();
        let mut commodities: Vec<Commodity> =
            records.iter().map(|r| r.commodity).collect();
        commodities.sort();
        commodities.dedup();
        for commodity in commodities {
            let subset: Vec<&BacktestRecord> = records
                .iter()
                .copied()
                .filter(|r| r.commodity == commodity)
                .collect();
            by_commodity.insert(commodity, horizon_stats(&subset));
        }

        Self {
            signal_count: outcome.records.len(),
            signals_skipped: outcome.signals_skipped,
            horizon_skipped: outcome.horizon_skipped.clone(),
            overall: horizon_stats(&records),
            by_commodity,
        }
    }

    /// Flattens the summary to a key/value map for persistence.
    ///
    /// Keys look like `wheat.h5.mean_return` or `overall.h1.hit_rate`;
    /// counts are carried as f64 for a uniform value type.
    #[must_use]
    pub fn to_flat(&self) -> BTreeMap<String, f64> {
        let mut flat = BTreeMap::new();
        flat.insert("signal_count".to_string(), self.signal_count as f64);
        flat.insert("signals_skipped".to_string(), self.signals_skipped as f64);
        for (&horizon, &count) in &self.horizon_skipped {
            flat.insert(format!("horizon_skipped.h{horizon}"), count as f64);
        }

        let mut insert_scope = |scope: &str, stats: &BTreeMap<usize, HorizonStats>| {
            for (horizon, s) in stats {
                flat.insert(format!("{scope}.h{horizon}.n"), s.n as f64);
                flat.insert(format!("{scope}.h{horizon}.mean_return"), s.mean_return);
                flat.insert(format!("{scope}.h{horizon}.hit_rate"), s.hit_rate);
                flat.insert(
                    format!("{scope}.h{horizon}.bullish.mean_return"),
                    s.bullish.mean_return,
                );
                flat.insert(
                    format!("{scope}.h{horizon}.bearish.mean_return"),
                    s.bearish.mean_return,
                );
            }
        };

        insert_scope("overall", &self.overall);
        for (commodity, stats) in &self.by_commodity {
            insert_scope(commodity.as_str(), stats);
        }
        flat
    }

    /// Serializes the summary to pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-horizon statistics over a record subset.
///
/// Horizons with no evaluated record are absent from the map rather than
/// present with zeroed fields.
fn horizon_stats(records: &[&BacktestRecord]) -> BTreeMap<usize, HorizonStats> {
    let mut stats = BTreeMap::new();

    for horizon in HORIZONS {
        let evaluated: Vec<(&BacktestRecord, f64)> = records
            .iter()
            .filter_map(|r| r.forward_returns.get(&horizon).map(|&ret| (*r, ret)))
            .collect();
        if evaluated.is_empty() {
            continue;
        }

        let n = evaluated.len();
        let mean_return = evaluated.iter().map(|(_, ret)| ret).sum::<f64>() / n as f64;

        let directional: Vec<&BacktestRecord> = evaluated
            .iter()
            .map(|(r, _)| *r)
            .filter(|r| r.predicted_bias.is_directional())
            .collect();
        let hit_count = directional
            .iter()
            .filter(|r| r.hits.get(&horizon).copied().unwrap_or(false))
            .count();
        let hit_rate = if directional.is_empty() {
            0.0
        } else {
            hit_count as f64 / directional.len() as f64
        };

        stats.insert(
            horizon,
            HorizonStats {
                n,
                mean_return,
                hit_rate,
                bullish: bias_stats(&evaluated, horizon, Sentiment::Bullish),
                bearish: bias_stats(&evaluated, horizon, Sentiment::Bearish),
            },
        );
    }

    stats
}

fn bias_stats(
    evaluated: &[(&BacktestRecord, f64)],
    horizon: usize,
    bias: Sentiment,
) -> BiasStats {
    let subset: Vec<(&BacktestRecord, f64)> = evaluated
        .iter()
        .copied()
        .filter(|(r, _)| r.predicted_bias == bias)
        .collect();
    if subset.is_empty() {
        return BiasStats::default();
    }

    let n = subset.len();
    let mean_return = subset.iter().map(|(_, ret)| ret).sum::<f64>() / n as f64;
    let hit_count = subset
        .iter()
        .filter(|(r, _)| r.hits.get(&horizon).copied().unwrap_or(false))
        .count();

    BiasStats {
        n,
        mean_return,
        hit_rate: hit_count as f64 / n as f64,
    }
}
