//! Trigger keyword matching.
//!
//! The configured keyword table is compiled once into a `KeywordMatcher`
//! and treated as immutable for the run's lifetime. A table term matches an
//! article if the extractor flagged it as a risk keyword or if it appears
//! verbatim in the summary; multi-word terms ("export ban") match as
//! phrases.

use grainflow_core::{ArticleRecord, KeywordEntry};

/// A trigger keyword that matched one article.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    /// The table term that matched, lowercased.
    pub term: String,
    /// Severity weight of the term.
    pub weight: f64,
}

/// Compiled trigger keyword table.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    entries: Vec<KeywordEntry>,
}

impl KeywordMatcher {
    /// Compiles the configured keyword table.
    ///
    /// Terms are lowercased once here so per-article matching does no
    /// allocation beyond the summary lowering.
    #[must_use]
    pub fn from_config(keywords: &[KeywordEntry]) -> Self {
        let entries = keywords
            .iter()
            .map(|k| KeywordEntry {
                term: k.term.trim().to_lowercase(),
                weight: k.weight,
            })
            .collect();
        Self { entries }
    }

    /// Number of terms in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the hits for one article, in table order.
    ///
    /// Each table term is reported at most once even if it matches both a
    /// risk keyword and the summary.
    #[must_use]
    pub fn matches(&self, article: &ArticleRecord) -> Vec<KeywordHit> {
        let summary = article.summary.to_lowercase();

        self.entries
            .iter()
            .filter(|entry| {
                article
                    .risk_keywords
                    .iter()
                    .any(|kw| kw == &entry.term || kw.contains(&entry.term))
                    || summary.contains(&entry.term)
            })
            .map(|entry| KeywordHit {
                term: entry.term.clone(),
                weight: entry.weight,
            })
            .collect()
    }

    /// Sum of weights over a hit list.
    #[must_use]
    pub fn total_weight(hits: &[KeywordHit]) -> f64 {
        hits.iter().map(|h| h.weight).sum()
    }
}
