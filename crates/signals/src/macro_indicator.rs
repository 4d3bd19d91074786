//! Macro-grains indicator aggregation.
//!
//! Rolls the day's macro-relevant article severities into the five
//! sub-factor scores (weather, fx, energy, shipping, other) and their
//! weighted composite. Aggregation is a pure function of the frozen
//! article set: re-running it over identical input yields bit-identical
//! scores.

use chrono::{Duration, NaiveDate};
use grainflow_core::{
    ArticleRecord, MacroConfig, MacroIndicator, MacroTheme, Result, SignalScore,
};
use std::collections::HashMap;

/// URL fragments that pin an otherwise unclassified article to a theme.
///
/// Institutional weather and market data providers are recognizable from
/// their hostnames even when the extractor labels the event "other".
const WEATHER_HINTS: &[&str] = &["noaa", "droughtmonitor", "ecmwf", "climate.gov"];
const FX_HINTS: &[&str] = &["currencies/usd", "dollar-index", "usd-brl", "usd-ars"];
const ENERGY_HINTS: &[&str] = &["brent-oil", "eia.gov", "energy"];
const SHIPPING_HINTS: &[&str] = &["splash247", "blackseagrain", "baltic"];

/// Classifies a macro article into its sub-factor bucket.
///
/// Event type decides first; articles that land in the residual bucket get
/// a second chance via URL hints.
#[must_use]
pub fn classify_theme(article: &ArticleRecord) -> MacroTheme {
    let theme = MacroTheme::from_event_type(article.event_type);
    if theme != MacroTheme::Other {
        return theme;
    }

    let Some(url) = article.url.as_deref() else {
        return MacroTheme::Other;
    };
    let url = url.to_lowercase();

    if WEATHER_HINTS.iter().any(|h| url.contains(h)) {
        MacroTheme::Weather
    } else if FX_HINTS.iter().any(|h| url.contains(h)) {
        MacroTheme::Fx
    } else if ENERGY_HINTS.iter().any(|h| url.contains(h)) {
        MacroTheme::Energy
    } else if SHIPPING_HINTS.iter().any(|h| url.contains(h)) {
        MacroTheme::Shipping
    } else {
        MacroTheme::Other
    }
}

/// Aggregates the day's signal scores into the macro indicator.
///
/// Only macro-relevant articles inside the reporting window contribute;
/// with `latest_day_only` (the default) that further narrows to articles
/// published on the run date. An empty contribution set yields the
/// all-zero indicator, never an error.
///
/// # Errors
/// Returns `InvariantViolation` if a computed score escapes [0, 5], which
/// the clamped sub-factors and convex composite rule out short of a bug.
pub fn aggregate(
    date: NaiveDate,
    articles: &[ArticleRecord],
    scores: &[SignalScore],
    config: &MacroConfig,
) -> Result<MacroIndicator> {
    let by_id: HashMap<&str, &SignalScore> = scores
        .iter()
        .map(|s| (s.article_id.as_str(), s))
        .collect();

    let window_start = date - Duration::days(config.window_days);

    let mut sums: HashMap<MacroTheme, f64> = HashMap::new();
    let mut contributing = 0usize;

    for article in articles {
        if !article.is_macro_relevant() {
            continue;
        }
        let article_date = article.date();
        if article_date > date || article_date < window_start {
            continue;
        }
        if config.latest_day_only && article_date != date {
            continue;
        }
        let Some(score) = by_id.get(article.id.as_str()) else {
            continue;
        };

        *sums.entry(classify_theme(article)).or_insert(0.0) += score.severity_score;
        contributing += 1;
    }

    let sub = |theme: MacroTheme| -> f64 {
        (sums.get(&theme).copied().unwrap_or(0.0) * config.scaling).min(MacroIndicator::MAX_SCORE)
    };

    let weather = sub(MacroTheme::Weather);
    let fx = sub(MacroTheme::Fx);
    let energy = sub(MacroTheme::Energy);
    let shipping = sub(MacroTheme::Shipping);
    let other = sub(MacroTheme::Other);

    let composite = MacroTheme::all()
        .into_iter()
        .map(|theme| {
            config.weights.weight_for(theme)
                * match theme {
                    MacroTheme::Weather => weather,
                    MacroTheme::Fx => fx,
                    MacroTheme::Energy => energy,
                    MacroTheme::Shipping => shipping,
                    MacroTheme::Other => other,
                }
        })
        .sum();

    tracing::debug!(
        %date,
        contributing,
        composite,
        "aggregated macro indicator"
    );

    MacroIndicator::new(date, weather, fx, energy, shipping, other, composite)
}
