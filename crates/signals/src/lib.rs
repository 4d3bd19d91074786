//! Signal scoring for multi-source grain-market news.
//!
//! Takes validated LLM extractions through per-article scoring into the
//! daily aggregates: macro indicator, tiered alerts, and price-impact
//! estimates. Per-article stages are pure and safe to parallelize; the
//! aggregation stages need the complete day's batch and run after the
//! pipeline join.

pub mod alerts;
pub mod keywords;
pub mod macro_indicator;
pub mod normalizer;
pub mod pipeline;
pub mod price_impact;
pub mod scorer;

pub use alerts::{assign_tier, evaluate, summary_similarity};
pub use keywords::{KeywordHit, KeywordMatcher};
pub use normalizer::{normalize, normalize_batch, BatchOutcome};
pub use pipeline::{daily_signals, run_daily, DailyOutputs};
pub use price_impact::{daily_confidence, daily_estimate, estimate, CalibrationTable};
pub use scorer::{alert_ordering, score_article, score_with_hits};
