//! Backtest evaluation of grain news signals against futures closes.

pub mod evaluator;
pub mod metrics;
pub mod price_series;

pub use evaluator::{join_signals, BacktestRecord, JoinOutcome, HORIZONS};
pub use metrics::{BacktestSummary, BiasStats, HorizonStats};
pub use price_series::PriceSeries;
