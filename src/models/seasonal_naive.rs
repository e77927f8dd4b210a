//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value observed on the same day of the previous
//! cycle, looked up by calendar date. When that day is missing from the
//! history the lookup steps back one more cycle; if no cycle has the day, the
//! last observation is used.

use crate::core::{DailySeries, Forecast};
use crate::error::{EventError, Result};
use crate::models::Forecaster;
use crate::utils::interval_z;
use chrono::{Duration, NaiveDate};

/// Seasonal Naive forecaster with a period in calendar days.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    history: Option<DailySeries>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days)).ok_or_else(|| {
        EventError::TimestampError(format!("{} days from {} is out of range", days, date))
    })
}

impl SeasonalNaive {
    /// Create a new SeasonalNaive model with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            history: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Same weekday last week.
    pub fn weekly() -> Self {
        Self::new(7)
    }

    /// Value for step `h` (0-based) after the last observation, and the
    /// number of cycles looked back to find it.
    fn seasonal_value(&self, history: &DailySeries, h: usize) -> Result<(f64, usize)> {
        let (Some(first), Some(last)) = (history.first_date(), history.last_date()) else {
            return Err(EventError::EmptySeries);
        };
        let period = self.period as i64;
        let target = shift(last, h as i64 + 1)?;

        // First cycle that lands inside the history
        let mut cycles = h / self.period + 1;
        let mut candidate = shift(target, -(cycles as i64) * period)?;
        while candidate >= first {
            if let Some(value) = history.value_on(candidate) {
                return Ok((value, cycles));
            }
            cycles += 1;
            candidate = shift(candidate, -period)?;
        }

        let fallback = history.values()[history.len() - 1];
        Ok((fallback, h / self.period + 1))
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::weekly()
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let span = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days() as usize + 1,
            _ => 0,
        };
        if span < self.period {
            return Err(EventError::InsufficientHistory {
                needed: self.period,
                got: span,
            });
        }

        // y_hat[t] = y[t - period days], NaN when that day is absent
        let lag = self.period as i64;
        let fitted: Vec<f64> = series
            .dates()
            .iter()
            .map(|d| {
                d.checked_sub_signed(Duration::days(lag))
                    .and_then(|prev| series.value_on(prev))
                    .unwrap_or(f64::NAN)
            })
            .collect();

        let residuals: Vec<f64> = series
            .values()
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        let valid: Vec<f64> = residuals.iter().copied().filter(|r| !r.is_nan()).collect();
        self.residual_variance = if valid.is_empty() {
            None
        } else {
            Some(valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64)
        };

        self.history = Some(series.clone());
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(EventError::FitRequired)?;

        let predictions = (0..horizon)
            .map(|h| self.seasonal_value(history, h).map(|(value, _)| value))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(EventError::FitRequired)?;
        let sigma = self.residual_variance.unwrap_or(0.0).sqrt();
        let z = interval_z(level)?;

        let mut predictions = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for h in 0..horizon {
            let (pred, cycles) = self.seasonal_value(history, h)?;
            predictions.push(pred);

            // Standard error grows with the number of cycles looked back
            let se = sigma * (cycles as f64).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(predictions, lower, upper))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DailySeriesBuilder;
    use approx::assert_relative_eq;
    use chrono::Datelike;

    fn start() -> NaiveDate {
        // A Monday
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn make_series(values: Vec<f64>) -> DailySeries {
        DailySeriesBuilder::new()
            .contiguous_from(start(), values)
            .build()
            .unwrap()
    }

    /// Four weeks valued by weekday (Monday = 0), without the listed dates.
    fn weekday_series_without(missing: &[NaiveDate]) -> DailySeries {
        let dates: Vec<NaiveDate> = (0..28)
            .map(|i| start() + Duration::days(i))
            .filter(|d| !missing.contains(d))
            .collect();
        let values = dates
            .iter()
            .map(|d| d.weekday().num_days_from_monday() as f64)
            .collect();
        DailySeries::new(dates, values).unwrap()
    }

    #[test]
    fn weekly_model_repeats_last_week() {
        let values: Vec<f64> = (0..14).map(|i| ((i % 7) + 1) as f64).collect();
        let mut model = SeasonalNaive::weekly();
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(7).unwrap();
        assert_eq!(forecast.point(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn forecast_beyond_one_season_wraps() {
        let mut model = SeasonalNaive::new(4);
        model
            .fit(&make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]))
            .unwrap();

        let forecast = model.predict(8).unwrap();
        assert_eq!(&forecast.point()[0..4], &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(&forecast.point()[4..8], &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn missing_day_keeps_weekdays_aligned() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 24).unwrap();
        let mut model = SeasonalNaive::weekly();
        model.fit(&weekday_series_without(&[wednesday])).unwrap();

        let forecast = model.predict(7).unwrap();
        assert_eq!(forecast.point(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn missing_day_widens_its_interval() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 24).unwrap();
        let mut series = weekday_series_without(&[wednesday]);
        // Break the weekly pattern once so residuals are non-zero
        let mut values = series.values().to_vec();
        values[0] = 3.0;
        series = DailySeries::new(series.dates().to_vec(), values).unwrap();

        let mut model = SeasonalNaive::weekly();
        model.fit(&series).unwrap();
        let forecast = model.predict_with_intervals(7, 0.9).unwrap();
        let width = |i: usize| forecast.upper().unwrap()[i] - forecast.lower().unwrap()[i];

        // Tuesday is found last week, Wednesday two weeks back
        assert!(width(2) > width(1));
    }

    #[test]
    fn unseen_weekday_falls_back_to_last_value() {
        // Two working weeks, Monday 01-01 to Friday 01-12
        let dates: Vec<NaiveDate> = (0..12)
            .map(|i| start() + Duration::days(i))
            .filter(|d| d.weekday().num_days_from_monday() < 5)
            .collect();
        let values: Vec<f64> = (1..=dates.len()).map(|v| v as f64).collect();
        let series = DailySeries::new(dates, values).unwrap();

        let mut model = SeasonalNaive::weekly();
        model.fit(&series).unwrap();
        let forecast = model.predict(3).unwrap();

        // Saturday and Sunday were never observed; Monday 01-15 repeats 01-08
        assert_eq!(forecast.point(), &[10.0, 10.0, 6.0]);
    }

    #[test]
    fn requires_full_season() {
        let mut model = SeasonalNaive::weekly();
        assert!(matches!(
            model.fit(&make_series(vec![1.0, 2.0, 3.0])),
            Err(EventError::InsufficientHistory { needed: 7, got: 3 })
        ));
        assert!(matches!(model.predict(3), Err(EventError::FitRequired)));
    }

    #[test]
    fn fitted_values_and_residuals() {
        let mut model = SeasonalNaive::new(4);
        model
            .fit(&make_series(vec![1.0, 2.0, 3.0, 4.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[..4].iter().all(|f| f.is_nan()));
        assert_eq!(&fitted[4..], &[1.0, 2.0, 3.0, 4.0]);

        let residuals = model.residuals().unwrap();
        assert!(residuals[0].is_nan());
        assert_relative_eq!(residuals[4], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn intervals_widen_per_season() {
        let values: Vec<f64> = (0..16).map(|i| ((i % 4) as f64) + 0.1 * (i as f64)).collect();
        let mut model = SeasonalNaive::new(4);
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict_with_intervals(8, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        assert!(upper[4] - lower[4] > upper[0] - lower[0]);
    }
}
