//! Event query for a candidate date.

use crate::core::{DailySeries, ForecastPoint};
use crate::detection::{weekday_name, WeekdaySummary};
use crate::error::{EventError, Result};
use crate::source::parse_date;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Historical event rate and forecast coverage for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventQueryResult {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub weekday_name: &'static str,
    /// Event days observed on this weekday.
    pub weekday_events: usize,
    /// Historical days observed on this weekday.
    pub weekday_days: usize,
    /// weekday_events / weekday_days, 0 when no such days exist.
    pub historical_rate: f64,
    pub within_forecast_horizon: bool,
}

/// Parse the candidate date picked by the user.
pub fn parse_candidate_date(raw: Option<&str>) -> Result<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EventError::InvalidDateSelection("select a date first".to_string()))?;

    parse_date(raw).map_err(|_| EventError::InvalidDateSelection(format!("malformed date '{}'", raw)))
}

/// Report the weekday event rate and forecast coverage of `date`.
pub fn query_event_date(
    date: NaiveDate,
    weekdays: &WeekdaySummary,
    forecast: &[ForecastPoint],
    history: &DailySeries,
) -> EventQueryResult {
    let weekday = date.weekday();
    let weekday_events = weekdays.event_count(weekday);
    let weekday_days = history.count_weekday(weekday);

    let historical_rate = if weekday_days > 0 {
        (weekday_events as f64 / weekday_days as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    EventQueryResult {
        date,
        weekday,
        weekday_name: weekday_name(weekday),
        weekday_events,
        weekday_days,
        historical_rate,
        within_forecast_horizon: forecast.iter().any(|p| p.date == date),
    }
}

/// Parse and query in one step; a missing or malformed date is `InvalidDateSelection`.
pub fn query_event(
    raw: Option<&str>,
    weekdays: &WeekdaySummary,
    forecast: &[ForecastPoint],
    history: &DailySeries,
) -> Result<EventQueryResult> {
    let date = parse_candidate_date(raw)?;
    Ok(query_event_date(date, weekdays, forecast, history))
}
