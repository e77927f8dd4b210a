//! Event-day detection against a centered rolling average.
//!
//! A day is an event when its value exceeds the centered 7-day mean around it
//! by more than a configured multiplier.

use crate::core::DailySeries;
use crate::detection::weekday::WeekdaySummary;
use crate::error::{EventError, Result};
use crate::transform::rolling_mean;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Width of the centered rolling window in days.
pub const ROLLING_WINDOW: usize = 7;

/// Per-date rolling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub value: f64,
    pub rolling_mean: f64,
    pub weekday: Weekday,
    pub is_event: bool,
}

impl DailyStat {
    /// value / rolling mean, or `None` when the mean is zero or undefined.
    pub fn excess_ratio(&self) -> Option<f64> {
        if self.rolling_mean.is_finite() && self.rolling_mean > 0.0 {
            Some(self.value / self.rolling_mean)
        } else {
            None
        }
    }
}

/// Rolling statistics for a whole series at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStats {
    threshold: f64,
    stats: Vec<DailyStat>,
}

impl RollingStats {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn stats(&self) -> &[DailyStat] {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Days flagged as events.
    pub fn events(&self) -> impl Iterator<Item = &DailyStat> {
        self.stats.iter().filter(|s| s.is_event)
    }

    pub fn event_count(&self) -> usize {
        self.events().count()
    }

    pub fn event_dates(&self) -> Vec<NaiveDate> {
        self.events().map(|s| s.date).collect()
    }
}

/// Rolling statistics and their weekday summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub stats: RollingStats,
    pub weekdays: WeekdaySummary,
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 1.0 {
        return Err(EventError::InvalidParameter(format!(
            "threshold must be a finite ratio above 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

/// Whether `value` exceeds `mean * threshold`.
///
/// A zero or undefined mean never flags.
pub fn is_event(value: f64, mean: f64, threshold: f64) -> bool {
    mean.is_finite() && mean > 0.0 && value > mean * threshold
}

/// Compute the centered rolling mean and event flag for every date.
pub fn compute_rolling_stats(series: &DailySeries, threshold: f64) -> Result<RollingStats> {
    validate_threshold(threshold)?;

    let means = rolling_mean(series.values(), ROLLING_WINDOW, true, 1);
    let stats = series
        .points()
        .zip(means)
        .map(|(point, mean)| DailyStat {
            date: point.date,
            value: point.value,
            rolling_mean: mean,
            weekday: point.date.weekday(),
            is_event: is_event(point.value, mean, threshold),
        })
        .collect();

    Ok(RollingStats { threshold, stats })
}

/// Detect event days and summarize them by weekday.
pub fn detect_events(series: &DailySeries, threshold: f64) -> Result<EventReport> {
    let stats = compute_rolling_stats(series, threshold)?;
    let weekdays = WeekdaySummary::from_stats(&stats);

    log::debug!(
        "detected {} event days over {} days at threshold {:.2}",
        stats.event_count(),
        stats.len(),
        threshold
    );

    Ok(EventReport { stats, weekdays })
}
