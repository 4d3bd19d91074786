//! Backtest evaluation.
//!
//! Joins the historical daily signals with per-commodity close series and
//! measures realized forward returns over the standard horizons. A signal
//! is a hit when the sign of the realized return matches its predicted
//! bias; neutral-bias signals carry no prediction and are excluded from
//! hit rates without counting as misses.

use crate::price_series::PriceSeries;
use chrono::NaiveDate;
use grainflow_core::{Commodity, DailySignal, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forward-return horizons, in trading days.
pub const HORIZONS: [usize; 4] = [1, 5, 10, 20];

/// One signal joined with its realized forward returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRecord {
    /// Date the signal was generated.
    pub signal_date: NaiveDate,
    /// Commodity the signal applies to.
    pub commodity: Commodity,
    /// Predicted bias at signal time.
    pub predicted_bias: Sentiment,
    /// Net signed score behind the bias.
    pub net_score: f64,
    /// Realized forward return per horizon; absent horizons were skipped.
    pub forward_returns: BTreeMap<usize, f64>,
    /// Hit flag per evaluated horizon; only present for directional bias.
    pub hits: BTreeMap<usize, bool>,
}

impl BacktestRecord {
    /// Returns true if any horizon could be evaluated.
    #[must_use]
    pub fn has_returns(&self) -> bool {
        !self.forward_returns.is_empty()
    }
}

/// Result of joining signals with price history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinOutcome {
    /// Joined records, in input signal order.
    pub records: Vec<BacktestRecord>,
    /// Skipped horizon evaluations, per horizon.
    pub horizon_skipped: BTreeMap<usize, usize>,
    /// Signals dropped entirely for lack of a price series.
    pub signals_skipped: usize,
}

/// Joins a signal history with per-commodity price series.
///
/// Missing price data never fails the evaluation: a signal without a
/// series for its commodity is skipped and counted, and a horizon with
/// insufficient future closes is skipped and counted per horizon. The
/// computation is deterministic given identical inputs.
#[must_use]
pub fn join_signals(
    signals: &[DailySignal],
    prices: &BTreeMap<Commodity, PriceSeries>,
) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();

    for signal in signals {
        let Some(series) = prices.get(&signal.commodity) else {
            tracing::warn!(
                commodity = %signal.commodity,
                date = %signal.date,
                "no price series for signal, skipping"
            );
            outcome.signals_skipped += 1;
            continue;
        };

        let mut record = BacktestRecord {
            signal_date: signal.date,
            commodity: signal.commodity,
            predicted_bias: signal.bias,
            net_score: signal.net_score,
            forward_returns: BTreeMap::new(),
            hits: BTreeMap::new(),
        };

        for horizon in HORIZONS {
            match series.forward_return(signal.date, horizon) {
                Ok(forward_return) => {
                    record.forward_returns.insert(horizon, forward_return);
                    if signal.bias.is_directional() {
                        let hit = forward_return * signal.bias.sign() > 0.0;
                        record.hits.insert(horizon, hit);
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "horizon skipped");
                    *outcome.horizon_skipped.entry(horizon).or_insert(0) += 1;
                }
            }
        }

        outcome.records.push(record);
    }

    outcome
}
