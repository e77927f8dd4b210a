//! Forecast stage: minimum-history policy, dated horizon and what-if overlay.

use crate::core::{DailySeries, ForecastPoint};
use crate::detection::WeekdaySummary;
use crate::error::{EventError, Result};
use crate::models::{ForecastModel, Forecaster, HolidayCalendar};
use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

/// Fewest observations a model is fitted on.
pub const MIN_HISTORY: usize = 10;

/// Default central interval level.
pub const DEFAULT_INTERVAL_LEVEL: f64 = 0.8;

/// Longest forecast horizon accepted, in days.
pub const MAX_HORIZON_DAYS: usize = 366;

/// Reject horizons outside `1..=MAX_HORIZON_DAYS`.
pub fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 || horizon > MAX_HORIZON_DAYS {
        return Err(EventError::InvalidParameter(format!(
            "forecast horizon must be within 1..={} days, got {}",
            MAX_HORIZON_DAYS, horizon
        )));
    }
    Ok(())
}

/// Parameters of one forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    pub horizon: usize,
    pub holiday_country: Option<String>,
    pub min_history: usize,
    pub interval_level: f64,
    pub model: ForecastModel,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            horizon: 7,
            holiday_country: Some("FR".to_string()),
            min_history: MIN_HISTORY,
            interval_level: DEFAULT_INTERVAL_LEVEL,
            model: ForecastModel::Additive,
        }
    }
}

/// Fit `model` on `series` and return exactly `horizon` dated points after
/// the last observation.
pub fn forecast_with(
    model: &mut dyn Forecaster,
    series: &DailySeries,
    horizon: usize,
    min_history: usize,
    level: f64,
) -> Result<Vec<ForecastPoint>> {
    check_horizon(horizon)?;

    let needed = min_history.max(1);
    if series.len() < needed {
        return Err(EventError::InsufficientHistory {
            needed,
            got: series.len(),
        });
    }
    let last = series.last_date().ok_or(EventError::EmptySeries)?;

    model.fit(series)?;
    let forecast = model.predict_with_intervals(horizon, level)?;
    if forecast.horizon() != horizon {
        return Err(EventError::ComputationError(format!(
            "{} returned {} steps for horizon {}",
            model.name(),
            forecast.horizon(),
            horizon
        )));
    }

    log::debug!(
        "{} forecast: {} days after {}",
        model.name(),
        horizon,
        last
    );

    forecast.dated(last)
}

/// Forecast `series` with the model and holiday calendar named in `options`.
pub fn forecast_series(series: &DailySeries, options: &ForecastOptions) -> Result<Vec<ForecastPoint>> {
    check_horizon(options.horizon)?;

    let calendar = match (&options.holiday_country, series.first_date(), series.last_date()) {
        (Some(code), Some(first), Some(last)) => {
            let end = last
                .checked_add_signed(Duration::days(options.horizon as i64))
                .ok_or_else(|| {
                    EventError::TimestampError(format!(
                        "{} days after {} is out of range",
                        options.horizon, last
                    ))
                })?;
            Some(HolidayCalendar::covering(code, first, end)?)
        }
        (Some(code), _, _) if !HolidayCalendar::is_supported(code) => {
            return Err(EventError::UnknownHolidayCountry(code.clone()))
        }
        _ => None,
    };

    let mut model = options.model.build(calendar);
    forecast_with(
        model.as_mut(),
        series,
        options.horizon,
        options.min_history,
        options.interval_level,
    )
}

/// Event-amplified projection: each point scaled by
/// `1 + average excess ratio` of its weekday. No refit is involved.
pub fn apply_event_scenario(points: &[ForecastPoint], weekdays: &WeekdaySummary) -> Vec<ForecastPoint> {
    points
        .iter()
        .map(|p| p.scaled(1.0 + weekdays.average_excess_ratio(p.date.weekday())))
        .collect()
}
