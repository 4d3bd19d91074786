//! Engine configuration.
//!
//! Every threshold, weight, keyword and calibration entry the engine uses
//! lives here and is passed explicitly into component entry points. Scoring
//! functions never resolve hidden defaults; `EngineConfig::default()` is
//! the single place the reconstructed calibration values are written down,
//! and `validate()` rejects inconsistent configurations up front.

use crate::article::{Commodity, EventType};
use crate::signal::MacroTheme;
use serde::{Deserialize, Serialize};

/// Top-level configuration injected into every engine entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub macro_indicator: MacroConfig,
    pub alerts: AlertConfig,
    pub impact: ImpactConfig,
    pub pipeline: PipelineConfig,
    /// Trigger keyword table, multi-language, with severity weights.
    #[serde(default = "default_trigger_keywords")]
    pub keywords: Vec<KeywordEntry>,
}

/// Per-article scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Base severity per event type, each in [0, 1].
    pub event_base: EventBaseWeights,
    /// Severity increment per matched trigger keyword.
    pub keyword_boost: f64,
    /// Hard cap on severity after boosts.
    pub severity_cap: f64,
    /// Summed keyword weight at which the keyword score saturates at 1.0.
    pub keyword_weight_saturation: f64,
}

/// Base severity weight for each event type.
///
/// Weather, policy and geopolitics move grain markets harder than demand
/// or logistics news of the same sentiment strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBaseWeights {
    pub supply: f64,
    pub demand: f64,
    pub logistics: f64,
    pub weather: f64,
    pub policy: f64,
    pub fx: f64,
    pub energy: f64,
    pub geopolitics: f64,
    pub other: f64,
}

impl EventBaseWeights {
    /// Returns the base severity for an event type.
    #[must_use]
    pub fn base_for(&self, event_type: EventType) -> f64 {
        match event_type {
            EventType::Supply => self.supply,
            EventType::Demand => self.demand,
            EventType::Logistics => self.logistics,
            EventType::Weather => self.weather,
            EventType::Policy => self.policy,
            EventType::Fx => self.fx,
            EventType::Energy => self.energy,
            EventType::Geopolitics => self.geopolitics,
            EventType::Other => self.other,
        }
    }

    fn all(&self) -> [(EventType, f64); 9] {
        [
            (EventType::Supply, self.supply),
            (EventType::Demand, self.demand),
            (EventType::Logistics, self.logistics),
            (EventType::Weather, self.weather),
            (EventType::Policy, self.policy),
            (EventType::Fx, self.fx),
            (EventType::Energy, self.energy),
            (EventType::Geopolitics, self.geopolitics),
            (EventType::Other, self.other),
        ]
    }
}

/// Macro indicator aggregation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroConfig {
    /// Composite weights per sub-factor; must sum to 1.
    pub weights: MacroWeights,
    /// Severity-sum to sub-factor scaling constant.
    pub scaling: f64,
    /// Reporting window in days; articles older than this are ignored.
    pub window_days: i64,
    /// When true (default), only the run date's articles move the daily
    /// composite; when false the whole window aggregates.
    pub latest_day_only: bool,
}

/// Composite weights for the five macro sub-factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroWeights {
    pub weather: f64,
    pub fx: f64,
    pub energy: f64,
    pub shipping: f64,
    pub other: f64,
}

impl MacroWeights {
    /// Returns the composite weight for a theme.
    #[must_use]
    pub fn weight_for(&self, theme: MacroTheme) -> f64 {
        match theme {
            MacroTheme::Weather => self.weather,
            MacroTheme::Fx => self.fx,
            MacroTheme::Energy => self.energy,
            MacroTheme::Shipping => self.shipping,
            MacroTheme::Other => self.other,
        }
    }

    /// Sum of all five weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weather + self.fx + self.energy + self.shipping + self.other
    }
}

/// Alert tier thresholds and deduplication parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Severity at or above which an article is CRITICAL outright.
    pub critical_severity: f64,
    /// Severity floor for the keyword-combination CRITICAL rule.
    pub critical_combo_severity: f64,
    /// Matched keywords required for the combination CRITICAL rule.
    pub critical_combo_keywords: usize,
    /// Severity at or above which an article is at least WATCH.
    pub watch_severity: f64,
    /// Matched keywords at or above which an article is at least WATCH.
    pub watch_keywords: usize,
    /// Jaccard summary-token overlap at or above which two articles of the
    /// same (commodity, event type, date) are duplicates.
    pub dedup_similarity: f64,
}

/// Price-impact calibration and confidence parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// Calibration entries keyed by (commodity, event type).
    pub calibration: Vec<CalibrationEntry>,
    /// Commodity-level fallback ranges for uncalibrated pairs.
    pub commodity_defaults: Vec<CommodityDefaultEntry>,
    /// Confidence multiplier applied when falling back.
    pub fallback_confidence_scale: f64,
    /// Weights of the daily per-commodity confidence blend.
    pub confidence: ConfidenceWeights,
    /// Article count at which the count component saturates at 1.0.
    pub confidence_count_saturation: usize,
}

/// Historical price-move range for one (commodity, event type) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub commodity: Commodity,
    pub event_type: EventType,
    /// Historical low move, percent, magnitude.
    pub move_low: f64,
    /// Historical high move, percent, magnitude.
    pub move_high: f64,
    /// Sample confidence in [0, 1].
    pub confidence: f64,
}

/// Commodity-level fallback range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityDefaultEntry {
    pub commodity: Commodity,
    pub move_low: f64,
    pub move_high: f64,
    pub confidence: f64,
}

/// Weights of the daily confidence blend; must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub article_count: f64,
    pub sentiment_consistency: f64,
    pub source_quality: f64,
    pub alert_severity: f64,
    pub macro_alignment: f64,
}

impl ConfidenceWeights {
    /// Sum of all five weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.article_count
            + self.sentiment_consistency
            + self.source_quality
            + self.alert_severity
            + self.macro_alignment
    }
}

/// Pipeline execution parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on concurrently normalized/scored articles.
    pub max_concurrency: usize,
}

/// One trigger keyword with its severity weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Lowercased term; may contain spaces ("export ban").
    pub term: String,
    /// Severity weight, 1.0 (mild) to 4.0 (severe).
    pub weight: f64,
}

impl EngineConfig {
    /// Checks internal consistency of the configuration.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found. Run this
    /// once after loading; the scoring functions assume a valid config.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (event, base) in self.scoring.event_base.all() {
            if !(0.0..=1.0).contains(&base) {
                anyhow::bail!("event base weight for {event} must be in [0, 1], got {base}");
            }
        }
        if self.scoring.keyword_boost < 0.0 {
            anyhow::bail!("keyword_boost must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.scoring.severity_cap) || self.scoring.severity_cap == 0.0 {
            anyhow::bail!("severity_cap must be in (0, 1]");
        }
        if self.scoring.keyword_weight_saturation <= 0.0 {
            anyhow::bail!("keyword_weight_saturation must be positive");
        }

        let weight_sum = self.macro_indicator.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            anyhow::bail!("macro sub-factor weights must sum to 1, got {weight_sum}");
        }
        for theme in MacroTheme::all() {
            let w = self.macro_indicator.weights.weight_for(theme);
            if w < 0.0 {
                anyhow::bail!("macro weight for {theme} must be non-negative, got {w}");
            }
        }
        if self.macro_indicator.scaling <= 0.0 {
            anyhow::bail!("macro scaling must be positive");
        }
        if self.macro_indicator.window_days <= 0 {
            anyhow::bail!("macro window_days must be positive");
        }

        let a = &self.alerts;
        if !(a.watch_severity <= a.critical_combo_severity
            && a.critical_combo_severity <= a.critical_severity
            && a.critical_severity <= 1.0
            && a.watch_severity > 0.0)
        {
            anyhow::bail!(
                "alert thresholds must satisfy 0 < watch <= combo <= critical <= 1, got \
                 watch={} combo={} critical={}",
                a.watch_severity,
                a.critical_combo_severity,
                a.critical_severity
            );
        }
        if a.watch_keywords == 0 || a.critical_combo_keywords < a.watch_keywords {
            anyhow::bail!("alert keyword thresholds must satisfy 1 <= watch <= combo");
        }
        if !(0.0..=1.0).contains(&a.dedup_similarity) {
            anyhow::bail!("dedup_similarity must be in [0, 1]");
        }

        for entry in &self.impact.calibration {
            if entry.move_low > entry.move_high {
                anyhow::bail!(
                    "calibration range inverted for {}/{}",
                    entry.commodity,
                    entry.event_type
                );
            }
            if !(0.0..=1.0).contains(&entry.confidence) {
                anyhow::bail!(
                    "calibration confidence for {}/{} outside [0, 1]",
                    entry.commodity,
                    entry.event_type
                );
            }
        }
        for entry in &self.impact.commodity_defaults {
            if entry.move_low > entry.move_high {
                anyhow::bail!("fallback range inverted for {}", entry.commodity);
            }
        }
        if !(0.0..=1.0).contains(&self.impact.fallback_confidence_scale) {
            anyhow::bail!("fallback_confidence_scale must be in [0, 1]");
        }
        let conf_sum = self.impact.confidence.sum();
        if (conf_sum - 1.0).abs() > 1e-6 {
            anyhow::bail!("confidence weights must sum to 1, got {conf_sum}");
        }
        if self.impact.confidence_count_saturation == 0 {
            anyhow::bail!("confidence_count_saturation must be at least 1");
        }

        if self.pipeline.max_concurrency == 0 {
            anyhow::bail!("pipeline max_concurrency must be at least 1");
        }

        if self.keywords.is_empty() {
            anyhow::bail!("trigger keyword table must not be empty");
        }
        for kw in &self.keywords {
            if kw.term.trim().is_empty() || kw.weight <= 0.0 {
                anyhow::bail!("invalid keyword entry: {:?}", kw.term);
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            macro_indicator: MacroConfig::default(),
            alerts: AlertConfig::default(),
            impact: ImpactConfig::default(),
            pipeline: PipelineConfig::default(),
            keywords: default_trigger_keywords(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            event_base: EventBaseWeights::default(),
            keyword_boost: 0.15,
            severity_cap: 1.0,
            keyword_weight_saturation: 8.0,
        }
    }
}

impl Default for EventBaseWeights {
    fn default() -> Self {
        Self {
            supply: 0.55,
            demand: 0.4,
            logistics: 0.45,
            weather: 0.8,
            policy: 0.7,
            fx: 0.6,
            energy: 0.6,
            geopolitics: 0.75,
            other: 0.3,
        }
    }
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            weights: MacroWeights::default(),
            scaling: 0.5,
            window_days: 180,
            latest_day_only: true,
        }
    }
}

impl Default for MacroWeights {
    fn default() -> Self {
        Self {
            weather: 0.2,
            fx: 0.2,
            energy: 0.2,
            shipping: 0.2,
            other: 0.2,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_severity: 0.75,
            critical_combo_severity: 0.5,
            critical_combo_keywords: 2,
            watch_severity: 0.4,
            watch_keywords: 1,
            dedup_similarity: 0.5,
        }
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            calibration: default_calibration_table(),
            commodity_defaults: default_commodity_ranges(),
            fallback_confidence_scale: 0.5,
            confidence: ConfidenceWeights::default(),
            confidence_count_saturation: 10,
        }
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            article_count: 0.25,
            sentiment_consistency: 0.25,
            source_quality: 0.20,
            alert_severity: 0.15,
            macro_alignment: 0.15,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

/// Default calibration ranges per (grain, event type), percent moves.
///
/// Reconstructed from historical episode ranges; the same event-type shape
/// applies to each grain until per-grain history is calibrated.
fn default_calibration_table() -> Vec<CalibrationEntry> {
    let per_event: [(EventType, f64, f64, f64); 7] = [
        (EventType::Weather, 0.8, 1.5, 0.7),
        (EventType::Supply, 0.6, 1.2, 0.6),
        (EventType::Demand, 0.5, 1.0, 0.6),
        (EventType::Policy, 0.4, 1.0, 0.5),
        (EventType::Logistics, 0.2, 0.5, 0.5),
        (EventType::Geopolitics, 0.5, 1.3, 0.5),
        (EventType::Energy, 0.3, 0.8, 0.4),
    ];

    let mut table = Vec::with_capacity(Commodity::grains().len() * per_event.len());
    for commodity in Commodity::grains() {
        for (event_type, move_low, move_high, confidence) in per_event {
            table.push(CalibrationEntry {
                commodity,
                event_type,
                move_low,
                move_high,
                confidence,
            });
        }
    }
    table
}

/// Commodity-level fallback ranges used on calibration misses.
fn default_commodity_ranges() -> Vec<CommodityDefaultEntry> {
    [Commodity::Wheat, Commodity::Corn, Commodity::Soy]
        .into_iter()
        .map(|commodity| CommodityDefaultEntry {
            commodity,
            move_low: 0.1,
            move_high: 0.6,
            confidence: 0.3,
        })
        .collect()
}

/// Default multi-language trigger keyword table.
///
/// Terms cover weather damage, port/logistics disruption, trade policy and
/// conflict across the languages of the monitored sources; weights grade
/// severity from 1 (mild) to 4 (market-halting).
pub fn default_trigger_keywords() -> Vec<KeywordEntry> {
    const TABLE: &[(&str, f64)] = &[
        // weather / crop damage
        ("drought", 3.0),
        ("sécheresse", 3.0),
        ("sequia", 3.0),
        ("seca", 3.0),
        ("frost", 3.0),
        ("gel", 3.0),
        ("helada", 3.0),
        ("geada", 3.0),
        ("hail", 2.0),
        ("grêle", 2.0),
        ("granizo", 2.0),
        ("heatwave", 2.0),
        ("canicule", 2.0),
        ("ola de calor", 2.0),
        ("onda de calor", 2.0),
        // logistics / ports / shipping
        ("port closed", 4.0),
        ("port closure", 4.0),
        ("puerto cerrado", 4.0),
        ("porto fechado", 4.0),
        ("strike", 3.0),
        ("grève", 3.0),
        ("huelga", 3.0),
        ("greve", 3.0),
        ("grain corridor", 3.0),
        ("corridor", 2.0),
        ("blockade", 4.0),
        ("blocus", 4.0),
        // policy / trade flows / sanctions
        ("export ban", 4.0),
        ("export restriction", 3.0),
        ("export tax", 3.0),
        ("quota", 2.0),
        ("embargo", 4.0),
        ("sanction", 3.0),
        ("sanctions", 3.0),
        // conflict
        ("attack", 3.0),
        ("bombardment", 3.0),
        ("missile", 3.0),
        ("drone", 2.0),
        ("strike on port", 4.0),
        // production / harvest
        ("crop failure", 4.0),
        ("harvest loss", 3.0),
        ("yield loss", 3.0),
        ("poor yields", 3.0),
        // fx / currency stress
        ("devaluation", 3.0),
        ("currency crisis", 3.0),
        ("peso crash", 2.0),
    ];

    TABLE
        .iter()
        .map(|&(term, weight)| KeywordEntry {
            term: term.to_string(),
            weight,
        })
        .collect()
}
