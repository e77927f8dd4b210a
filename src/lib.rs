//! # eventcast
//!
//! Revenue event detection and short-horizon forecasting for serialized
//! content catalogs.
//!
//! Daily revenue rows are aggregated into a series, days exceeding a
//! multiple of the centered 7-day rolling mean are flagged as events,
//! events are bucketed by weekday, and an additive trend + weekly +
//! holiday model projects the next days. A scenario overlay amplifies the
//! forecast by each weekday's historical excess ratio.

#![allow(clippy::needless_range_loop)]

pub mod aggregate;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod transform;
pub mod utils;

pub use error::{EventError, Result};

pub mod prelude {
    pub use crate::aggregate::{ContentSelection, DateFilter};
    pub use crate::config::{PipelineConfig, Session};
    pub use crate::core::{DailySeries, ForecastPoint};
    pub use crate::detection::{detect_events, EventReport, WeekdaySummary};
    pub use crate::error::{EventError, Result};
    pub use crate::forecast::{apply_event_scenario, forecast_series, ForecastOptions};
    pub use crate::models::{ForecastModel, Forecaster, HolidayCalendar};
    pub use crate::pipeline::{run, DashboardReport, StageStatus};
    pub use crate::query::{query_event, EventQueryResult};
    pub use crate::source::{CachedSource, DataSource, InMemorySource, SqliteSource};
}
