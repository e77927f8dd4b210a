//! DailySeries data structure holding one value per calendar date.

use crate::error::{EventError, Result};
use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A single observation of a daily series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ordered daily series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Builder for constructing DailySeries.
#[derive(Debug, Clone, Default)]
pub struct DailySeriesBuilder {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = dates;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Consecutive calendar days starting at `start`, one per value.
    pub fn contiguous_from(mut self, start: NaiveDate, values: Vec<f64>) -> Self {
        self.dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        self.values = values;
        self
    }

    pub fn build(self) -> Result<DailySeries> {
        DailySeries::new(self.dates, self.values)
    }
}

impl DailySeries {
    /// Create a new DailySeries, validating ordering and lengths.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(EventError::InvalidParameter(format!(
                "dates and values differ in length: {} vs {}",
                dates.len(),
                values.len()
            )));
        }

        // Strictly increasing also rules out duplicates
        for w in dates.windows(2) {
            if w[1] <= w[0] {
                return Err(EventError::TimestampError(format!(
                    "dates must be strictly increasing ({} follows {})",
                    w[1], w[0]
                )));
            }
        }

        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over the series as points.
    pub fn points(&self) -> impl Iterator<Item = DailyPoint> + '_ {
        self.dates
            .iter()
            .zip(self.values.iter())
            .map(|(&date, &value)| DailyPoint { date, value })
    }

    /// Value observed on `date`, if any.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Number of observed dates falling on `weekday`.
    pub fn count_weekday(&self, weekday: Weekday) -> usize {
        use chrono::Datelike;
        self.dates.iter().filter(|d| d.weekday() == weekday).count()
    }

    /// Points within `days` of the last observed date (inclusive).
    pub fn recent(&self, days: i64) -> DailySeries {
        let Some(last) = self.last_date() else {
            return DailySeries::default();
        };
        let start = match last.checked_sub_signed(Duration::days(days)) {
            Some(cutoff) => self.dates.partition_point(|d| *d < cutoff),
            None => 0,
        };
        DailySeries {
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }
}
