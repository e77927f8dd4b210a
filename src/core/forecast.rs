//! Forecast result structures for holding predictions.

use crate::error::{EventError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A dated forecast value with an optional prediction interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            lower: None,
            upper: None,
        }
    }

    pub fn with_interval(date: NaiveDate, value: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            value,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Multiply the estimate and both bounds by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            date: self.date,
            value: self.value * factor,
            lower: self.lower.map(|l| l * factor),
            upper: self.upper.map(|u| u * factor),
        }
    }
}

/// Undated model output: point predictions and optional intervals, one entry
/// per step ahead.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Attach calendar dates: step `h` lands on `last_observed + h + 1` days.
    pub fn dated(&self, last_observed: NaiveDate) -> Result<Vec<ForecastPoint>> {
        for bound in [&self.lower, &self.upper].into_iter().flatten() {
            if bound.len() != self.point.len() {
                return Err(EventError::ComputationError(format!(
                    "interval length {} does not match horizon {}",
                    bound.len(),
                    self.point.len()
                )));
            }
        }

        self.point
            .iter()
            .enumerate()
            .map(|(h, &value)| {
                let date = last_observed
                    .checked_add_signed(Duration::days(h as i64 + 1))
                    .ok_or_else(|| {
                        EventError::TimestampError(format!(
                            "forecast step {} after {} is out of range",
                            h + 1,
                            last_observed
                        ))
                    })?;
                Ok(ForecastPoint {
                    date,
                    value,
                    lower: self.lower.as_ref().map(|l| l[h]),
                    upper: self.upper.as_ref().map(|u| u[h]),
                })
            })
            .collect()
    }
}
