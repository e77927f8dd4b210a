//! Additive trend + weekly seasonality + holiday model.
//!
//! Fits `y = intercept + slope * t + weekday effects + holiday effect` by
//! ordinary least squares. The trend is measured in days since the first
//! observation, scaled by the observed span, so the design stays well
//! conditioned for multi-year histories.

use crate::core::{DailySeries, Forecast};
use crate::error::{EventError, Result};
use crate::models::{Forecaster, HolidayCalendar};
use crate::utils::{interval_z, ols_fit, DesignMatrix, OLSResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

const TREND: &str = "trend";
const HOLIDAY: &str = "holiday";

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_column(weekday: Weekday) -> String {
    format!("weekday_{}", weekday)
}

/// Columns chosen at fit time and reused for prediction.
#[derive(Debug, Clone)]
struct DesignSpec {
    origin: NaiveDate,
    scale: f64,
    /// Weekdays with a dummy column; the first observed weekday is the
    /// reference level and has none.
    dummies: Vec<Weekday>,
    holidays: bool,
}

#[derive(Debug, Clone)]
struct FitState {
    spec: DesignSpec,
    ols: OLSResult,
    last_date: NaiveDate,
    n: usize,
    residual_std: f64,
}

/// Additive forecaster with optional country holidays.
#[derive(Debug, Clone, Default)]
pub struct AdditiveForecaster {
    calendar: Option<HolidayCalendar>,
    state: Option<FitState>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl AdditiveForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a holiday calendar; it must cover the forecast horizon as well
    /// as the history.
    pub fn with_holidays(mut self, calendar: HolidayCalendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn calendar(&self) -> Option<&HolidayCalendar> {
        self.calendar.as_ref()
    }

    /// Fitted holiday effect, if the holiday regressor was used.
    pub fn holiday_effect(&self) -> Option<f64> {
        self.state
            .as_ref()
            .filter(|s| s.spec.holidays)
            .and_then(|s| s.ols.coefficient(HOLIDAY))
    }

    /// Fitted trend slope per day.
    pub fn daily_slope(&self) -> Option<f64> {
        self.state
            .as_ref()
            .and_then(|s| s.ols.coefficient(TREND).map(|c| c / s.spec.scale))
    }

    /// Effect of `weekday` relative to the reference weekday.
    pub fn weekday_effect(&self, weekday: Weekday) -> Option<f64> {
        let state = self.state.as_ref()?;
        if state.spec.dummies.contains(&weekday) {
            state.ols.coefficient(&weekday_column(weekday))
        } else {
            Some(0.0)
        }
    }

    fn design(&self, spec: &DesignSpec, dates: &[NaiveDate]) -> Result<DesignMatrix> {
        let mut design = DesignMatrix::new();

        let trend = dates
            .iter()
            .map(|d| (*d - spec.origin).num_days() as f64 / spec.scale)
            .collect();
        design.push_column(TREND, trend)?;

        for &weekday in &spec.dummies {
            let column = dates
                .iter()
                .map(|d| if d.weekday() == weekday { 1.0 } else { 0.0 })
                .collect();
            design.push_column(weekday_column(weekday), column)?;
        }

        if spec.holidays {
            if let Some(calendar) = &self.calendar {
                design.push_column(HOLIDAY, calendar.indicator(dates))?;
            }
        }

        Ok(design)
    }
}

impl Forecaster for AdditiveForecaster {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let n = series.len();
        if n < 2 {
            return Err(EventError::InsufficientHistory { needed: 2, got: n });
        }
        if series.has_missing_values() {
            return Err(EventError::InvalidParameter(
                "series contains missing values".to_string(),
            ));
        }

        let dates = series.dates();
        let origin = dates[0];
        let last_date = dates[n - 1];
        let scale = ((last_date - origin).num_days() as f64).max(1.0);

        let present: Vec<Weekday> = WEEKDAYS
            .iter()
            .copied()
            .filter(|w| dates.iter().any(|d| d.weekday() == *w))
            .collect();
        let dummies = present.into_iter().skip(1).collect();

        let holidays = self.calendar.as_ref().is_some_and(|calendar| {
            let hits = dates.iter().filter(|d| calendar.is_holiday(**d)).count();
            hits > 0 && hits < n
        });

        let spec = DesignSpec {
            origin,
            scale,
            dummies,
            holidays,
        };
        let design = self.design(&spec, dates)?;
        let ols = ols_fit(series.values(), &design)?;

        let fitted = ols.predict(&design)?;
        let residuals: Vec<f64> = series
            .values()
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        let dof = n.saturating_sub(design.num_columns() + 1).max(1);
        let residual_std = (residuals.iter().map(|r| r * r).sum::<f64>() / dof as f64).sqrt();

        log::debug!(
            "additive fit on {} days: {} weekday effects, holidays={}, residual std {:.3}",
            n,
            spec.dummies.len(),
            spec.holidays,
            residual_std
        );

        self.state = Some(FitState {
            spec,
            ols,
            last_date,
            n,
            residual_std,
        });
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(EventError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let dates = (1..=horizon)
            .map(|h| {
                state
                    .last_date
                    .checked_add_signed(Duration::days(h as i64))
                    .ok_or_else(|| {
                        EventError::TimestampError(format!(
                            "{} days after {} is out of range",
                            h, state.last_date
                        ))
                    })
            })
            .collect::<Result<Vec<NaiveDate>>>()?;
        let design = self.design(&state.spec, &dates)?;

        Ok(Forecast::from_values(state.ols.predict(&design)?))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(EventError::FitRequired)?;
        let z = interval_z(level)?;
        let point = self.predict(horizon)?.point().to_vec();

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, &pred) in point.iter().enumerate() {
            // Widen slowly with distance from the fitted range
            let se = state.residual_std * (1.0 + (h + 1) as f64 / state.n as f64).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(point, lower, upper))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Additive"
    }
}
