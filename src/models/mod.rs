//! Forecasting models.

mod traits;

pub mod additive;
pub mod holidays;
pub mod seasonal_naive;

pub use additive::AdditiveForecaster;
pub use holidays::{easter_sunday, Holiday, HolidayCalendar, SUPPORTED_COUNTRIES};
pub use seasonal_naive::SeasonalNaive;
pub use traits::{BoxedForecaster, Forecaster};

use serde::{Deserialize, Serialize};

/// Model selection for the forecast stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    /// Trend + weekly seasonality + holidays.
    #[default]
    Additive,
    /// Same weekday last week.
    SeasonalNaive,
}

impl ForecastModel {
    /// Instantiate the model, attaching `calendar` where the model supports it.
    pub fn build(self, calendar: Option<HolidayCalendar>) -> BoxedForecaster {
        match self {
            ForecastModel::Additive => {
                let model = AdditiveForecaster::new();
                Box::new(match calendar {
                    Some(calendar) => model.with_holidays(calendar),
                    None => model,
                })
            }
            ForecastModel::SeasonalNaive => Box::new(SeasonalNaive::weekly()),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "additive" => Some(ForecastModel::Additive),
            "seasonal_naive" | "seasonalnaive" => Some(ForecastModel::SeasonalNaive),
            _ => None,
        }
    }
}
