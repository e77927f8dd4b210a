//! Forecaster trait defining the common interface for all models.

use crate::core::{DailySeries, Forecast};
use crate::error::Result;

/// Common interface for all forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to a clean daily series.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Generate predictions for the `horizon` days after the last observation.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with a central interval at `level` (e.g. 0.8).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use eventcast::models::{AdditiveForecaster, BoxedForecaster, Forecaster};
///
/// let model: BoxedForecaster = Box::new(AdditiveForecaster::new());
/// assert_eq!(model.name(), "Additive");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DailySeriesBuilder;
    use crate::models::{AdditiveForecaster, SeasonalNaive};
    use chrono::NaiveDate;

    fn make_series(n: usize) -> DailySeries {
        DailySeriesBuilder::new()
            .contiguous_from(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                (0..n).map(|i| 100.0 + (i % 7) as f64 * 5.0).collect(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn boxed_forecasters_share_interface() {
        let series = make_series(42);
        let mut models: Vec<BoxedForecaster> = vec![
            Box::new(AdditiveForecaster::new()),
            Box::new(SeasonalNaive::weekly()),
        ];

        for model in models.iter_mut() {
            assert!(!model.is_fitted());
            model.fit(&series).unwrap();
            assert!(model.is_fitted());
            assert_eq!(model.predict(7).unwrap().horizon(), 7);
            assert_eq!(model.fitted_values().unwrap().len(), series.len());
            assert_eq!(model.residuals().unwrap().len(), series.len());
        }
    }

    #[test]
    fn default_intervals_fall_back_to_points() {
        struct Constant(Option<Vec<f64>>);
        impl Forecaster for Constant {
            fn fit(&mut self, series: &DailySeries) -> Result<()> {
                self.0 = Some(vec![1.0; series.len()]);
                Ok(())
            }
            fn predict(&self, horizon: usize) -> Result<Forecast> {
                Ok(Forecast::from_values(vec![1.0; horizon]))
            }
            fn fitted_values(&self) -> Option<&[f64]> {
                self.0.as_deref()
            }
            fn residuals(&self) -> Option<&[f64]> {
                None
            }
            fn name(&self) -> &str {
                "Constant"
            }
        }

        let model = Constant(None);
        let forecast = model.predict_with_intervals(3, 0.8).unwrap();
        assert_eq!(forecast.horizon(), 3);
        assert!(forecast.lower().is_none());
    }
}
