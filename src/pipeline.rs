//! One recomputation pass: aggregate -> detect -> forecast.
//!
//! Data conditions (`EmptySeries`, `InsufficientHistory`) never abort a pass.
//! Each stage records its status and the report carries whatever partial
//! results were produced. Only invalid configuration and source failures
//! surface as `Err`.

use crate::aggregate::{aggregate_content, aggregate_payments, ContentSelection, PaymentSeries};
use crate::config::PipelineConfig;
use crate::core::{DailySeries, ForecastPoint};
use crate::detection::{detect_events, EventReport};
use crate::error::{EventError, Result};
use crate::forecast::{apply_event_scenario, forecast_series};
use crate::query::{query_event, EventQueryResult};
use crate::source::{content_titles, ContentRow, DataSource, PaymentRow};
use serde::Serialize;

/// Trailing window of the trend view, in days.
pub const RECENT_DAYS: i64 = 90;

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    /// Not enough data; informational.
    Skipped { reason: String },
    /// The stage ran and failed.
    Failed { reason: String },
    /// An upstream stage produced nothing to work on.
    NotRun,
}

impl StageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, StageStatus::Ok)
    }

    fn from_error(stage: &str, err: &EventError) -> Self {
        let reason = err.to_string();
        if err.is_data_condition() {
            log::warn!("{} skipped: {}", stage, reason);
            StageStatus::Skipped { reason }
        } else {
            log::error!("{} failed: {}", stage, reason);
            StageStatus::Failed { reason }
        }
    }
}

fn stage<T>(name: &str, result: Result<T>) -> (StageStatus, Option<T>) {
    match result {
        Ok(value) => (StageStatus::Ok, Some(value)),
        Err(err) => (StageStatus::from_error(name, &err), None),
    }
}

/// Content revenue section of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentReport {
    pub selection: ContentSelection,
    pub threshold: f64,
    pub aggregation: StageStatus,
    pub detection: StageStatus,
    pub forecasting: StageStatus,
    pub series: Option<DailySeries>,
    pub recent: Option<DailySeries>,
    pub events: Option<EventReport>,
    pub forecast: Vec<ForecastPoint>,
    /// Forecast amplified by historical weekday excess ratios.
    pub scenario: Vec<ForecastPoint>,
}

impl ContentReport {
    /// Event query against this report's history and forecast.
    pub fn query(&self, candidate: Option<&str>) -> Result<EventQueryResult> {
        match (&self.series, &self.events) {
            (Some(series), Some(events)) => {
                query_event(candidate, &events.weekdays, &self.forecast, series)
            }
            _ => Err(EventError::EmptySeries),
        }
    }
}

/// Payment revenue section of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReport {
    pub aggregation: StageStatus,
    pub forecasting: StageStatus,
    pub series: Option<PaymentSeries>,
    pub recent: Option<DailySeries>,
    pub forecast: Vec<ForecastPoint>,
}

/// Both dashboard sections plus the title list for selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub titles: Vec<String>,
    pub content: ContentReport,
    pub payments: PaymentReport,
}

/// Run aggregation, detection and forecasting over content rows.
pub fn run_content(rows: &[ContentRow], config: &PipelineConfig) -> Result<ContentReport> {
    config.validate()?;
    let selection = config.selection();

    let (aggregation, series) = stage(
        "content aggregation",
        aggregate_content(rows, &selection, &config.date_filter),
    );

    let (detection, events, forecasting, forecast) = match &series {
        Some(series) => {
            let (detection, events) =
                stage("event detection", detect_events(series, config.threshold));
            let (forecasting, forecast) = stage(
                "content forecast",
                forecast_series(series, &config.forecast_options()),
            );
            (detection, events, forecasting, forecast.unwrap_or_default())
        }
        None => (StageStatus::NotRun, None, StageStatus::NotRun, Vec::new()),
    };

    let scenario = match &events {
        Some(events) => apply_event_scenario(&forecast, &events.weekdays),
        None => Vec::new(),
    };

    if let Some(events) = &events {
        log::info!(
            "{}: {} event days, {} forecast days",
            selection.title().unwrap_or("all content"),
            events.stats.event_count(),
            forecast.len()
        );
    }

    Ok(ContentReport {
        selection,
        threshold: config.threshold,
        aggregation,
        detection,
        forecasting,
        recent: series.as_ref().map(|s| s.recent(RECENT_DAYS)),
        series,
        events,
        forecast,
        scenario,
    })
}

/// Run aggregation and forecasting over payment rows; no event detection.
pub fn run_payments(rows: &[PaymentRow], config: &PipelineConfig) -> Result<PaymentReport> {
    config.validate()?;

    let (aggregation, series) = stage(
        "payment aggregation",
        aggregate_payments(rows, &config.date_filter),
    );

    let (forecasting, forecast) = match &series {
        Some(series) => {
            let (status, points) = stage(
                "payment forecast",
                forecast_series(&series.amount, &config.forecast_options()),
            );
            (status, points.unwrap_or_default())
        }
        None => (StageStatus::NotRun, Vec::new()),
    };

    Ok(PaymentReport {
        aggregation,
        forecasting,
        recent: series.as_ref().map(|s| s.amount.recent(RECENT_DAYS)),
        series,
        forecast,
    })
}

/// Load both row sets from `source` and run the full dashboard pass.
pub fn run<S: DataSource + ?Sized>(source: &S, config: &PipelineConfig) -> Result<DashboardReport> {
    config.validate()?;

    let content_rows = source.content_rows()?;
    let payment_rows = source.payment_rows()?;
    log::info!(
        "loaded {} content rows and {} payment rows",
        content_rows.len(),
        payment_rows.len()
    );

    Ok(DashboardReport {
        titles: content_titles(&content_rows),
        content: run_content(&content_rows, config)?,
        payments: run_payments(&payment_rows, config)?,
    })
}
