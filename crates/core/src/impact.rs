//! Price-impact estimate record.

use crate::article::{Commodity, EventType};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Expected price-move range for a (commodity, event type) pair.
///
/// Moves are percentages of the futures close. The range is signed: a
/// bearish article yields a negative range. `low <= high` always holds;
/// confidence reflects reliability of the estimate, never the estimate
/// itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceImpactEstimate {
    /// Commodity the estimate applies to.
    pub commodity: Commodity,
    /// Event type driving the estimate.
    pub event_type: EventType,
    /// Lower bound of the expected move, in percent.
    pub expected_move_low: f64,
    /// Upper bound of the expected move, in percent.
    pub expected_move_high: f64,
    /// Reliability of the estimate in [0, 1].
    pub confidence: f64,
}

impl PriceImpactEstimate {
    /// Creates an estimate, enforcing `low <= high` and confidence bounds.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the range is inverted or confidence
    /// is outside [0, 1].
    pub fn new(
        commodity: Commodity,
        event_type: EventType,
        expected_move_low: f64,
        expected_move_high: f64,
        confidence: f64,
    ) -> Result<Self> {
        if expected_move_low > expected_move_high {
            return Err(EngineError::invariant(format!(
                "impact range inverted: low {expected_move_low} > high {expected_move_high}"
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(EngineError::invariant(format!(
                "impact confidence {confidence} outside [0, 1]"
            )));
        }
        Ok(Self {
            commodity,
            event_type,
            expected_move_low,
            expected_move_high,
            confidence,
        })
    }

    /// Midpoint of the expected move range, in percent.
    #[must_use]
    pub fn expected_move_mid(&self) -> f64 {
        (self.expected_move_low + self.expected_move_high) / 2.0
    }
}
