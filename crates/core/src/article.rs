//! Article domain types for the grain news signal engine.
//!
//! A `RawExtraction` is the string-typed record delivered by the upstream
//! LLM extraction collaborator. The normalizer turns it into a validated,
//! enum-typed `ArticleRecord` that the scoring components consume.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commodity covered by the signal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Wheat,
    Corn,
    Soy,
    /// Cross-cutting macro article not tied to a single grain.
    Macro,
}

impl Commodity {
    /// Returns the wire/string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Corn => "corn",
            Self::Soy => "soy",
            Self::Macro => "macro",
        }
    }

    /// Parses a commodity from its wire representation.
    ///
    /// Returns `None` for values outside the enumerated set; callers decide
    /// whether that is a validation failure.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wheat" => Some(Self::Wheat),
            "corn" => Some(Self::Corn),
            "soy" => Some(Self::Soy),
            "macro" => Some(Self::Macro),
            _ => None,
        }
    }

    /// All grain commodities (excludes the macro bucket).
    #[must_use]
    pub const fn grains() -> [Self; 3] {
        [Self::Wheat, Self::Corn, Self::Soy]
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event category assigned by the extraction collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Supply,
    Demand,
    Logistics,
    Weather,
    Policy,
    Fx,
    Energy,
    Geopolitics,
    Other,
}

impl EventType {
    /// Returns the wire/string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Demand => "demand",
            Self::Logistics => "logistics",
            Self::Weather => "weather",
            Self::Policy => "policy",
            Self::Fx => "fx",
            Self::Energy => "energy",
            Self::Geopolitics => "geopolitics",
            Self::Other => "other",
        }
    }

    /// Parses an event type from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "supply" => Some(Self::Supply),
            "demand" => Some(Self::Demand),
            "logistics" => Some(Self::Logistics),
            "weather" => Some(Self::Weather),
            "policy" => Some(Self::Policy),
            "fx" => Some(Self::Fx),
            "energy" => Some(Self::Energy),
            "geopolitics" => Some(Self::Geopolitics),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns true if articles of this event type feed the macro indicator.
    #[must_use]
    pub const fn is_macro_relevant(self) -> bool {
        matches!(
            self,
            Self::Weather
                | Self::Fx
                | Self::Energy
                | Self::Logistics
                | Self::Geopolitics
                | Self::Other
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label assigned by the extraction collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    /// Returns the wire/string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }

    /// Parses a sentiment from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Some(Self::Bullish),
            "bearish" => Some(Self::Bearish),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Signed polarity: +1 bullish, -1 bearish, 0 neutral.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Bullish => 1.0,
            Self::Bearish => -1.0,
            Self::Neutral => 0.0,
        }
    }

    /// Returns true if this sentiment carries a directional price bias.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        !matches!(self, Self::Neutral)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured record as delivered by the LLM extraction collaborator.
///
/// Fields are string-typed on purpose: the upstream collaborator speaks
/// JSON and may return values outside the enumerated domains, which the
/// normalizer rejects per article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    /// Stable article identifier assigned upstream.
    pub id: String,
    /// Source identifier (e.g., "usda", "blackseagrain").
    pub source: String,
    /// URL to the original article, when known.
    pub url: Option<String>,
    /// Publication timestamp.
    pub timestamp: DateTime<Utc>,
    /// ISO 639-1 language code of the original text.
    pub language: String,
    /// Commodity label, expected in {wheat, corn, soy, macro}.
    pub commodity: String,
    /// Event type label, expected in the enumerated event set.
    pub event_type: String,
    /// Sentiment label, expected in {bullish, bearish, neutral}.
    pub sentiment: String,
    /// Sentiment strength, expected in [0, 1].
    pub sentiment_strength: f64,
    /// Free-text risk keywords flagged by the extractor.
    pub risk_keywords: Vec<String>,
    /// Short free-text summary of the article.
    pub summary: String,
}

impl RawExtraction {
    /// Creates a minimal extraction; builder methods fill the rest.
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            url: None,
            timestamp,
            language: "en".to_string(),
            commodity: String::new(),
            event_type: String::new(),
            sentiment: "neutral".to_string(),
            sentiment_strength: 0.0,
            risk_keywords: Vec::new(),
            summary: String::new(),
        }
    }

    /// Sets the article URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the language code.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the commodity label.
    #[must_use]
    pub fn with_commodity(mut self, commodity: impl Into<String>) -> Self {
        self.commodity = commodity.into();
        self
    }

    /// Sets the event type label.
    #[must_use]
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Sets the sentiment label and strength.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: impl Into<String>, strength: f64) -> Self {
        self.sentiment = sentiment.into();
        self.sentiment_strength = strength;
        self
    }

    /// Sets the risk keyword list.
    #[must_use]
    pub fn with_risk_keywords(mut self, keywords: Vec<String>) -> Self {
        self.risk_keywords = keywords;
        self
    }

    /// Sets the free-text summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Validated, immutable article record.
///
/// Produced by the normalizer; owned by the pipeline run that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Stable article identifier.
    pub id: String,
    /// Source identifier.
    pub source: String,
    /// URL to the original article, when known.
    pub url: Option<String>,
    /// Publication timestamp.
    pub timestamp: DateTime<Utc>,
    /// ISO 639-1 language code.
    pub language: String,
    /// Validated commodity.
    pub commodity: Commodity,
    /// Validated event type.
    pub event_type: EventType,
    /// Validated sentiment.
    pub sentiment: Sentiment,
    /// Sentiment strength in [0, 1].
    pub sentiment_strength: f64,
    /// Lowercased, deduplicated risk keywords.
    pub risk_keywords: Vec<String>,
    /// Free-text summary.
    pub summary: String,
}

impl ArticleRecord {
    /// Calendar date of publication (UTC).
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Returns true if this article feeds the macro indicator.
    #[must_use]
    pub fn is_macro_relevant(&self) -> bool {
        self.event_type.is_macro_relevant()
    }
}
