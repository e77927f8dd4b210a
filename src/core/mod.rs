//! Core data structures for daily series and forecasts.

mod daily_series;
mod forecast;

pub use daily_series::{DailyPoint, DailySeries, DailySeriesBuilder};
pub use forecast::{Forecast, ForecastPoint};
