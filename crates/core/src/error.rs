//! Error types for the grain news signal engine.
//!
//! No error here is fatal to a whole pipeline run: malformed extractions
//! drop the offending article, calibration misses fall back to commodity
//! defaults, and missing price history skips the affected horizon. The one
//! exception is `InvariantViolation`, which indicates a scorer bug rather
//! than bad input and must surface as a hard error.

use crate::article::{Commodity, EventType};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur inside the signal scoring and backtest engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Upstream extraction is outside its enumerated domain.
    #[error("invalid extraction for article {article_id}: {reason}")]
    Validation {
        /// Identifier of the rejected article.
        article_id: String,
        /// What was out of domain.
        reason: String,
    },

    /// No calibration table entry for a (commodity, event type) pair.
    #[error("no calibration entry for {commodity}/{event_type}")]
    CalibrationMiss {
        /// Commodity looked up.
        commodity: Commodity,
        /// Event type looked up.
        event_type: EventType,
    },

    /// Not enough future closes to compute a forward return.
    #[error("insufficient price history at {date} for {horizon}-day horizon")]
    InsufficientPriceHistory {
        /// Signal date whose horizon could not be evaluated.
        date: NaiveDate,
        /// Requested horizon in trading days.
        horizon: usize,
    },

    /// Aggregate-level inconsistency; indicates a programming bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Creates a validation error for a single article.
    pub fn validation(article_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            article_id: article_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a calibration miss error.
    #[must_use]
    pub fn calibration_miss(commodity: Commodity, event_type: EventType) -> Self {
        Self::CalibrationMiss {
            commodity,
            event_type,
        }
    }

    /// Creates an insufficient-price-history error.
    #[must_use]
    pub fn insufficient_history(date: NaiveDate, horizon: usize) -> Self {
        Self::InsufficientPriceHistory { date, horizon }
    }

    /// Creates an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Returns true if the run can continue after this error.
    ///
    /// Validation drops one article, calibration misses fall back, and
    /// missing price history skips one horizon. Invariant violations never
    /// recover.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Construction Tests ====================

    #[test]
    fn validation_error_mentions_article_and_reason() {
        let err = EngineError::validation("a42", "commodity 'rice' not in enumerated set");
        let display = err.to_string();
        assert!(display.contains("a42"));
        assert!(display.contains("rice"));
    }

    #[test]
    fn calibration_miss_mentions_pair() {
        let err = EngineError::calibration_miss(Commodity::Soy, EventType::Energy);
        let display = err.to_string();
        assert!(display.contains("soy"));
        assert!(display.contains("energy"));
    }

    #[test]
    fn insufficient_history_mentions_date_and_horizon() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let err = EngineError::insufficient_history(date, 20);
        let display = err.to_string();
        assert!(display.contains("2025-06-10"));
        assert!(display.contains("20"));
    }

    #[test]
    fn invariant_violation_carries_message() {
        let err = EngineError::invariant("composite 5.3 outside [0, 5]");
        assert!(err.to_string().contains("composite 5.3"));
    }

    // ==================== Recoverability Tests ====================

    #[test]
    fn validation_is_recoverable() {
        assert!(EngineError::validation("a1", "bad").is_recoverable());
    }

    #[test]
    fn calibration_miss_is_recoverable() {
        assert!(EngineError::calibration_miss(Commodity::Wheat, EventType::Other).is_recoverable());
    }

    #[test]
    fn insufficient_history_is_recoverable() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert!(EngineError::insufficient_history(date, 5).is_recoverable());
    }

    #[test]
    fn invariant_violation_is_not_recoverable() {
        assert!(!EngineError::invariant("bug").is_recoverable());
    }
}
