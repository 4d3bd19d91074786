//! Per-article signal scores and the daily macro indicator.
//!
//! `SignalScore` is derived once per article by the scorer and never
//! mutated. `MacroIndicator` is the daily 0-5 synthetic index over the five
//! macro sub-factors; its constructor enforces the range invariant because
//! an out-of-range value means a scorer bug, not bad input.

use crate::article::{Commodity, EventType, Sentiment};
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores derived from one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalScore {
    /// Identifier of the scored article.
    pub article_id: String,
    /// Signed sentiment polarity times strength, in [-1, 1].
    pub sentiment_score: f64,
    /// Event severity in [0, 1].
    pub severity_score: f64,
    /// Trigger-keyword weight in [0, 1].
    pub weighted_keyword_score: f64,
    /// Trigger keywords that matched, lowercased.
    pub matched_keywords: Vec<String>,
}

impl SignalScore {
    /// Creates a signal score, enforcing range invariants.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if any score is outside its range;
    /// the scorer is supposed to produce bounded values by construction.
    pub fn new(
        article_id: impl Into<String>,
        sentiment_score: f64,
        severity_score: f64,
        weighted_keyword_score: f64,
        matched_keywords: Vec<String>,
    ) -> Result<Self> {
        if !(-1.0..=1.0).contains(&sentiment_score) {
            return Err(EngineError::invariant(format!(
                "sentiment_score {sentiment_score} outside [-1, 1]"
            )));
        }
        if !(0.0..=1.0).contains(&severity_score) {
            return Err(EngineError::invariant(format!(
                "severity_score {severity_score} outside [0, 1]"
            )));
        }
        if !(0.0..=1.0).contains(&weighted_keyword_score) {
            return Err(EngineError::invariant(format!(
                "weighted_keyword_score {weighted_keyword_score} outside [0, 1]"
            )));
        }
        Ok(Self {
            article_id: article_id.into(),
            sentiment_score,
            severity_score,
            weighted_keyword_score,
            matched_keywords,
        })
    }

    /// Number of trigger keywords that matched.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.matched_keywords.len()
    }
}

/// Macro sub-factor bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroTheme {
    Weather,
    Fx,
    Energy,
    Shipping,
    Other,
}

impl MacroTheme {
    /// Returns the wire/string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Fx => "fx",
            Self::Energy => "energy",
            Self::Shipping => "shipping",
            Self::Other => "other",
        }
    }

    /// All five themes, in composite-weight order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Weather,
            Self::Fx,
            Self::Energy,
            Self::Shipping,
            Self::Other,
        ]
    }

    /// Maps a macro-relevant event type to its sub-factor bucket.
    ///
    /// Logistics articles land in shipping; geopolitics has no bucket of
    /// its own and folds into other, as does anything unclassified.
    #[must_use]
    pub const fn from_event_type(event_type: EventType) -> Self {
        match event_type {
            EventType::Weather => Self::Weather,
            EventType::Fx => Self::Fx,
            EventType::Energy => Self::Energy,
            EventType::Logistics => Self::Shipping,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MacroTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily synthetic macro-grains risk index.
///
/// One instance per run date. All sub-factors and the composite live in
/// [0, 5]; the composite is a deterministic weighted combination of the
/// five sub-factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroIndicator {
    /// Run date the indicator describes.
    pub date: NaiveDate,
    /// Weather sub-factor in [0, 5].
    pub weather: f64,
    /// FX sub-factor in [0, 5].
    pub fx: f64,
    /// Energy sub-factor in [0, 5].
    pub energy: f64,
    /// Shipping sub-factor in [0, 5].
    pub shipping: f64,
    /// Residual sub-factor in [0, 5].
    pub other: f64,
    /// Weighted composite in [0, 5].
    pub composite: f64,
}

impl MacroIndicator {
    /// Upper bound of every sub-factor and the composite.
    pub const MAX_SCORE: f64 = 5.0;

    /// Creates an indicator, enforcing the [0, 5] invariant on every field.
    ///
    /// # Errors
    /// Returns `InvariantViolation` when any score is out of range. The
    /// aggregation clamps sub-factors at 5 and the composite is a convex
    /// combination, so a violation here is a scorer bug.
    pub fn new(
        date: NaiveDate,
        weather: f64,
        fx: f64,
        energy: f64,
        shipping: f64,
        other: f64,
        composite: f64,
    ) -> Result<Self> {
        for (name, value) in [
            ("weather", weather),
            ("fx", fx),
            ("energy", energy),
            ("shipping", shipping),
            ("other", other),
            ("composite", composite),
        ] {
            if !(0.0..=Self::MAX_SCORE).contains(&value) {
                return Err(EngineError::invariant(format!(
                    "macro {name} score {value} outside [0, 5]"
                )));
            }
        }
        Ok(Self {
            date,
            weather,
            fx,
            energy,
            shipping,
            other,
            composite,
        })
    }

    /// Creates an all-zero indicator for a day with no macro articles.
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            weather: 0.0,
            fx: 0.0,
            energy: 0.0,
            shipping: 0.0,
            other: 0.0,
            composite: 0.0,
        }
    }

    /// Returns the sub-factor score for a theme.
    #[must_use]
    pub fn sub_factor(&self, theme: MacroTheme) -> f64 {
        match theme {
            MacroTheme::Weather => self.weather,
            MacroTheme::Fx => self.fx,
            MacroTheme::Energy => self.energy,
            MacroTheme::Shipping => self.shipping,
            MacroTheme::Other => self.other,
        }
    }
}

/// Net directional signal for one (trading day, commodity).
///
/// Produced by summing signed per-article sentiment scores over the day;
/// consumed by the backtest evaluator as the predicted bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignal {
    /// Trading day the signal describes.
    pub date: NaiveDate,
    /// Commodity the signal applies to.
    pub commodity: Commodity,
    /// Predicted bias derived from the sign of `net_score`.
    pub bias: Sentiment,
    /// Sum of signed sentiment scores over the day's articles.
    pub net_score: f64,
}

impl DailySignal {
    /// Derives the daily signal from a net signed score.
    #[must_use]
    pub fn from_net_score(date: NaiveDate, commodity: Commodity, net_score: f64) -> Self {
        let bias = if net_score > 0.0 {
            Sentiment::Bullish
        } else if net_score < 0.0 {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        };
        Self {
            date,
            commodity,
            bias,
            net_score,
        }
    }
}
