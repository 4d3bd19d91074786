//! Early-warning alert types.
//!
//! Tier assignment and deduplication live in the signals crate; these are
//! the records handed to the report and notification collaborators.

use crate::article::{Commodity, EventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert tier, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertTier {
    Info,
    Watch,
    Critical,
}

impl AlertTier {
    /// Returns the display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Watch => "WATCH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tiered early-warning alert for one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Article that triggered the alert.
    pub article_id: String,
    /// Commodity the article concerns.
    pub commodity: Commodity,
    /// Event type of the article.
    pub event_type: EventType,
    /// Assigned tier; terminal for the run.
    pub tier: AlertTier,
    /// Human-readable trigger reason.
    pub reason: String,
    /// When the alert was created.
    pub triggered_at: DateTime<Utc>,
}

/// An alert suppressed by deduplication, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedAlert {
    /// The alert that was suppressed.
    pub alert: Alert,
    /// Article id of the surviving alert it duplicates.
    pub suppressed_by: String,
}

/// Result of alert evaluation for one day's batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSet {
    /// Surviving alerts, ordered most severe first.
    pub active: Vec<Alert>,
    /// Duplicates suppressed by deduplication.
    pub suppressed: Vec<SuppressedAlert>,
}

impl AlertSet {
    /// Highest tier among active alerts, if any.
    #[must_use]
    pub fn highest_tier(&self) -> Option<AlertTier> {
        self.active.iter().map(|a| a.tier).max()
    }

    /// Number of active alerts at or above a tier.
    #[must_use]
    pub fn count_at_or_above(&self, tier: AlertTier) -> usize {
        self.active.iter().filter(|a| a.tier >= tier).count()
    }

    /// Highest tier for a specific commodity, if any alert exists for it.
    #[must_use]
    pub fn highest_tier_for(&self, commodity: Commodity) -> Option<AlertTier> {
        self.active
            .iter()
            .filter(|a| a.commodity == commodity)
            .map(|a| a.tier)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_alert(tier: AlertTier, commodity: Commodity) -> Alert {
        Alert {
            article_id: "a1".to_string(),
            commodity,
            event_type: EventType::Weather,
            tier,
            reason: "test".to_string(),
            triggered_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn tier_ordering_is_monotonic() {
        assert!(AlertTier::Info < AlertTier::Watch);
        assert!(AlertTier::Watch < AlertTier::Critical);
    }

    #[test]
    fn tier_serializes_uppercase() {
        let json = serde_json::to_string(&AlertTier::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn highest_tier_over_mixed_set() {
        let set = AlertSet {
            active: vec![
                sample_alert(AlertTier::Info, Commodity::Corn),
                sample_alert(AlertTier::Critical, Commodity::Wheat),
                sample_alert(AlertTier::Watch, Commodity::Soy),
            ],
            suppressed: vec![],
        };

        assert_eq!(set.highest_tier(), Some(AlertTier::Critical));
        assert_eq!(set.count_at_or_above(AlertTier::Watch), 2);
        assert_eq!(set.highest_tier_for(Commodity::Soy), Some(AlertTier::Watch));
        assert_eq!(set.highest_tier_for(Commodity::Macro), None);
    }

    #[test]
    fn empty_set_has_no_highest_tier() {
        let set = AlertSet::default();
        assert_eq!(set.highest_tier(), None);
        assert_eq!(set.count_at_or_above(AlertTier::Info), 0);
    }
}
