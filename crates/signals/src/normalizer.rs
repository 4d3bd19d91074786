//! Article record normalization.
//!
//! Turns the string-typed `RawExtraction` delivered by the LLM collaborator
//! into a validated `ArticleRecord`. Out-of-domain values are hard
//! validation failures for that article — clamping would hide a
//! malfunctioning extractor — but never for the batch: rejected articles
//! are dropped, counted, and logged.

use grainflow_core::{
    ArticleRecord, Commodity, EngineError, EventType, RawExtraction, Sentiment,
};
use std::collections::BTreeSet;

/// Outcome of normalizing a batch of raw extractions.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully validated records, in input order.
    pub records: Vec<ArticleRecord>,
    /// Per-article validation failures, in input order.
    pub rejected: Vec<EngineError>,
}

impl BatchOutcome {
    /// Number of rejected articles.
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Validates one raw extraction into an `ArticleRecord`.
///
/// # Errors
/// Returns `Validation` if commodity, event type, or sentiment is outside
/// its enumerated set, or if sentiment strength is not a finite value in
/// [0, 1].
pub fn normalize(raw: &RawExtraction) -> Result<ArticleRecord, EngineError> {
    let commodity = Commodity::parse(&raw.commodity).ok_or_else(|| {
        EngineError::validation(
            &raw.id,
            format!("commodity '{}' not in enumerated set", raw.commodity),
        )
    })?;

    let event_type = EventType::parse(&raw.event_type).ok_or_else(|| {
        EngineError::validation(
            &raw.id,
            format!("event_type '{}' not in enumerated set", raw.event_type),
        )
    })?;

    let sentiment = Sentiment::parse(&raw.sentiment).ok_or_else(|| {
        EngineError::validation(
            &raw.id,
            format!("sentiment '{}' not in enumerated set", raw.sentiment),
        )
    })?;

    if !raw.sentiment_strength.is_finite() || !(0.0..=1.0).contains(&raw.sentiment_strength) {
        return Err(EngineError::validation(
            &raw.id,
            format!(
                "sentiment_strength {} outside [0, 1]",
                raw.sentiment_strength
            ),
        ));
    }

    // Lowercase, trim, drop empties, dedup; sorted order keeps the record
    // deterministic regardless of extractor ordering.
    let risk_keywords: Vec<String> = raw
        .risk_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(ArticleRecord {
        id: raw.id.clone(),
        source: raw.source.clone(),
        url: raw.url.clone(),
        timestamp: raw.timestamp,
        language: raw.language.clone(),
        commodity,
        event_type,
        sentiment,
        sentiment_strength: raw.sentiment_strength,
        risk_keywords,
        summary: raw.summary.trim().to_string(),
    })
}

/// Normalizes a batch, dropping and counting invalid articles.
///
/// The batch never fails as a whole; an empty input yields an empty
/// outcome.
#[must_use]
pub fn normalize_batch(raws: &[RawExtraction]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for raw in raws {
        match normalize(raw) {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                tracing::warn!(article_id = %raw.id, error = %err, "dropping invalid extraction");
                outcome.rejected.push(err);
            }
        }
    }

    outcome
}
