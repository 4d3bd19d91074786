//! Daily close-price series.
//!
//! The series is the engine's view of the external market-data
//! collaborator: closes indexed by trading day. Forward returns count
//! trading days within the series itself, so weekends and holidays never
//! distort a horizon.

use chrono::NaiveDate;
use grainflow_core::{Commodity, EngineError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One commodity's daily closes, ascending by date.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    commodity: Commodity,
    closes: Vec<(NaiveDate, Decimal)>,
    index: HashMap<NaiveDate, usize>,
}

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: NaiveDate,
    close: Decimal,
}

impl PriceSeries {
    /// Builds a series from (date, close) pairs.
    ///
    /// Input order does not matter; duplicate dates keep the last close
    /// seen, matching how a feed revision supersedes the original print.
    #[must_use]
    pub fn new(commodity: Commodity, closes: Vec<(NaiveDate, Decimal)>) -> Self {
        let mut map: HashMap<NaiveDate, Decimal> = HashMap::with_capacity(closes.len());
        for (date, close) in closes {
            map.insert(date, close);
        }

        let mut closes: Vec<(NaiveDate, Decimal)> = map.into_iter().collect();
        closes.sort_by_key(|(date, _)| *date);

        let index = closes
            .iter()
            .enumerate()
            .map(|(i, (date, _))| (*date, i))
            .collect();

        Self {
            commodity,
            closes,
            index,
        }
    }

    /// Loads a series from a `date,close` CSV file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a row fails to parse.
    pub fn from_csv_path(commodity: Commodity, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;

        let mut closes = Vec::new();
        for row in reader.deserialize() {
            let row: CloseRow = row?;
            closes.push((row.date, row.close));
        }

        tracing::debug!(%commodity, rows = closes.len(), path = %path.display(), "loaded price series");
        Ok(Self::new(commodity, closes))
    }

    /// Commodity this series prices.
    #[must_use]
    pub fn commodity(&self) -> Commodity {
        self.commodity
    }

    /// Number of trading days in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns true if the series has no closes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// First and last trading day covered, if any.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.closes.first(), self.closes.last()) {
            (Some((first, _)), Some((last, _))) => Some((*first, *last)),
            _ => None,
        }
    }

    /// Close on a specific trading day.
    #[must_use]
    pub fn close_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.index.get(&date).map(|&i| self.closes[i].1)
    }

    /// Forward return over `horizon` trading days from `date`.
    ///
    /// `(price[i + horizon] - price[i]) / price[i]`, where `i` is the
    /// series position of `date`.
    ///
    /// # Errors
    /// Returns `InsufficientPriceHistory` if the signal date is not a
    /// trading day in the series, if fewer than `horizon` closes follow
    /// it, or if the base close is not a positive price. All are
    /// recoverable skips, never fabricated values.
    pub fn forward_return(&self, date: NaiveDate, horizon: usize) -> Result<f64, EngineError> {
        let Some(&i) = self.index.get(&date) else {
            return Err(EngineError::insufficient_history(date, horizon));
        };
        let Some((_, future)) = self.closes.get(i + horizon) else {
            return Err(EngineError::insufficient_history(date, horizon));
        };

        let base = self.closes[i].1;
        if base <= Decimal::ZERO {
            return Err(EngineError::insufficient_history(date, horizon));
        }

        let ratio = (*future - base) / base;
        Ok(ratio.to_string().parse::<f64>().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn rising_series() -> PriceSeries {
        PriceSeries::new(
            Commodity::Wheat,
            vec![
                (date(2), dec!(100)),
                (date(3), dec!(101)),
                (date(4), dec!(102)),
                (date(5), dec!(103)),
                (date(6), dec!(104)),
            ],
        )
    }

    #[test]
    fn series_sorts_unordered_input() {
        let series = PriceSeries::new(
            Commodity::Corn,
            vec![(date(5), dec!(103)), (date(2), dec!(100)), (date(3), dec!(101))],
        );

        assert_eq!(series.date_range(), Some((date(2), date(5))));
        assert_eq!(series.close_on(date(3)), Some(dec!(101)));
    }

    #[test]
    fn duplicate_dates_keep_last_close() {
        let series = PriceSeries::new(
            Commodity::Corn,
            vec![(date(2), dec!(100)), (date(2), dec!(105))],
        );

        assert_eq!(series.len(), 1);
        assert_eq!(series.close_on(date(2)), Some(dec!(105)));
    }

    #[test]
    fn forward_return_over_one_day() {
        let r = rising_series().forward_return(date(2), 1).unwrap();
        assert!((r - 0.01).abs() < 1e-9);
    }

    #[test]
    fn forward_return_counts_trading_days_not_calendar_days() {
        // The series has no weekend rows; horizon 2 from June 5 lands on
        // the second following row regardless of calendar gaps.
        let series = PriceSeries::new(
            Commodity::Wheat,
            vec![
                (date(5), dec!(100)),  // Thursday
                (date(6), dec!(101)),  // Friday
                (date(9), dec!(104)),  // Monday
            ],
        );

        let r = series.forward_return(date(5), 2).unwrap();
        assert!((r - 0.04).abs() < 1e-9);
    }

    #[test]
    fn horizon_past_series_end_is_an_error() {
        let err = rising_series().forward_return(date(5), 5).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPriceHistory { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn missing_signal_date_is_an_error() {
        let err = rising_series().forward_return(date(1), 1).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientPriceHistory { .. }));
    }

    #[test]
    fn nonpositive_base_close_is_skipped() {
        let series = PriceSeries::new(
            Commodity::Soy,
            vec![(date(2), dec!(0)), (date(3), dec!(10))],
        );
        assert!(series.forward_return(date(2), 1).is_err());
    }

    #[test]
    fn empty_series_reports_empty() {
        let series = PriceSeries::new(Commodity::Soy, vec![]);
        assert!(series.is_empty());
        assert_eq!(series.date_range(), None);
    }
}
