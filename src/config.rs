//! Pipeline configuration and per-session state.
//!
//! Configuration is an explicit value passed into every recomputation; the
//! session that owns it is the only place it changes.

use crate::aggregate::{ContentSelection, DateFilter};
use crate::error::{EventError, Result};
use crate::forecast::{check_horizon, ForecastOptions, DEFAULT_INTERVAL_LEVEL, MIN_HISTORY};
use crate::models::{ForecastModel, HolidayCalendar};
use serde::{Deserialize, Serialize};
use std::env;

/// Default event threshold (170% of the rolling mean).
pub const DEFAULT_THRESHOLD: f64 = 1.7;

/// Forecast horizons offered to users, in days.
pub const HORIZON_CHOICES: [usize; 3] = [7, 15, 30];

/// Inputs consumed by one pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Event multiplier over the rolling mean, > 1.0.
    pub threshold: f64,
    pub forecast_horizon_days: usize,
    /// Holiday regressor country; independent of display locale.
    pub holiday_country_code: Option<String>,
    /// Content title, `None` aggregates all content.
    pub grouping_key: Option<String>,
    pub min_history: usize,
    pub interval_level: f64,
    pub model: ForecastModel,
    pub date_filter: DateFilter,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            forecast_horizon_days: HORIZON_CHOICES[0],
            holiday_country_code: Some("FR".to_string()),
            grouping_key: None,
            min_history: MIN_HISTORY,
            interval_level: DEFAULT_INTERVAL_LEVEL,
            model: ForecastModel::Additive,
            date_filter: DateFilter::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `EVENTCAST_THRESHOLD` (default: 1.7)
    /// - `EVENTCAST_HORIZON_DAYS` (default: 7)
    /// - `EVENTCAST_HOLIDAY_COUNTRY` (default: FR, empty disables holidays)
    /// - `EVENTCAST_TITLE` (default: all content)
    /// - `EVENTCAST_MIN_HISTORY` (default: 10)
    /// - `EVENTCAST_INTERVAL_LEVEL` (default: 0.8)
    /// - `EVENTCAST_MODEL` (default: additive)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any name -> value lookup using the `from_env` variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            threshold: parsed(lookup("EVENTCAST_THRESHOLD")).unwrap_or(defaults.threshold),
            forecast_horizon_days: parsed(lookup("EVENTCAST_HORIZON_DAYS"))
                .unwrap_or(defaults.forecast_horizon_days),
            holiday_country_code: match lookup("EVENTCAST_HOLIDAY_COUNTRY") {
                Some(code) if code.trim().is_empty() => None,
                Some(code) => Some(code.trim().to_string()),
                None => defaults.holiday_country_code,
            },
            grouping_key: lookup("EVENTCAST_TITLE").filter(|t| !t.trim().is_empty()),
            min_history: parsed(lookup("EVENTCAST_MIN_HISTORY")).unwrap_or(defaults.min_history),
            interval_level: parsed(lookup("EVENTCAST_INTERVAL_LEVEL"))
                .unwrap_or(defaults.interval_level),
            model: lookup("EVENTCAST_MODEL")
                .and_then(|m| ForecastModel::parse(&m))
                .unwrap_or(defaults.model),
            date_filter: defaults.date_filter,
        }
    }

    /// Reject configurations no pipeline stage can run with.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 1.0 {
            return Err(EventError::InvalidParameter(format!(
                "threshold must be above 1.0, got {}",
                self.threshold
            )));
        }
        check_horizon(self.forecast_horizon_days)?;
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(EventError::InvalidParameter(format!(
                "interval level must lie in (0, 1), got {}",
                self.interval_level
            )));
        }
        if let (Some(start), Some(end)) = (self.date_filter.start, self.date_filter.end) {
            if start > end {
                return Err(EventError::InvalidParameter(format!(
                    "date filter starts after it ends ({} > {})",
                    start, end
                )));
            }
        }
        if let Some(code) = &self.holiday_country_code {
            if !HolidayCalendar::is_supported(code) {
                return Err(EventError::UnknownHolidayCountry(code.clone()));
            }
        }
        Ok(())
    }

    pub fn selection(&self) -> ContentSelection {
        ContentSelection::from(self.grouping_key.clone())
    }

    pub fn forecast_options(&self) -> ForecastOptions {
        ForecastOptions {
            horizon: self.forecast_horizon_days,
            holiday_country: self.holiday_country_code.clone(),
            min_history: self.min_history,
            interval_level: self.interval_level,
            model: self.model,
        }
    }
}

/// Config owned by one user session; never persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: PipelineConfig,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Set the threshold from a percentage in 100..=500 (170 = 1.7x).
    ///
    /// The resulting ratio must still exceed 1.0, so 100 is rejected.
    pub fn set_threshold_percent(&mut self, percent: u32) -> Result<()> {
        if !(100..=500).contains(&percent) {
            return Err(EventError::InvalidParameter(format!(
                "threshold percent must be within 100..=500, got {}",
                percent
            )));
        }
        self.set_threshold(percent as f64 / 100.0)
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        let mut next = self.config.clone();
        next.threshold = threshold;
        next.validate()?;
        log::info!("event threshold set to {:.0}%", threshold * 100.0);
        self.config = next;
        Ok(())
    }

    pub fn threshold_percent(&self) -> u32 {
        (self.config.threshold * 100.0).round() as u32
    }

    pub fn select_title(&mut self, title: Option<String>) {
        self.config.grouping_key = title;
    }

    pub fn set_horizon(&mut self, days: usize) -> Result<()> {
        let mut next = self.config.clone();
        next.forecast_horizon_days = days;
        next.validate()?;
        self.config = next;
        Ok(())
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) -> Result<()> {
        let mut next = self.config.clone();
        next.date_filter = filter;
        next.validate()?;
        self.config = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.threshold, 1.7);
        assert_eq!(config.forecast_horizon_days, 7);
        assert_eq!(config.holiday_country_code.as_deref(), Some("FR"));
        assert_eq!(config.selection(), ContentSelection::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad = |f: fn(&mut PipelineConfig)| {
            let mut config = PipelineConfig::default();
            f(&mut config);
            config.validate()
        };

        assert!(bad(|c| c.threshold = 1.0).is_err());
        assert!(bad(|c| c.threshold = f64::INFINITY).is_err());
        assert!(bad(|c| c.forecast_horizon_days = 0).is_err());
        assert!(bad(|c| c.forecast_horizon_days = 367).is_err());
        assert!(bad(|c| c.forecast_horizon_days = 200_000_000).is_err());
        assert!(bad(|c| c.forecast_horizon_days = 366).is_ok());
        assert!(bad(|c| c.interval_level = 1.0).is_err());
        assert_eq!(
            bad(|c| c.holiday_country_code = Some("JP".to_string())),
            Err(EventError::UnknownHolidayCountry("JP".to_string()))
        );
        assert!(bad(|c| c.holiday_country_code = None).is_ok());
        assert!(bad(|c| {
            c.date_filter = DateFilter::between(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
        })
        .is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"threshold": 1.2, "holiday_country_code": "DE"}"#).unwrap();
        assert_eq!(config.threshold, 1.2);
        assert_eq!(config.holiday_country_code.as_deref(), Some("DE"));
        assert_eq!(config.forecast_horizon_days, 7);
        assert_eq!(config.model, ForecastModel::Additive);
    }

    #[test]
    fn session_threshold_percent() {
        let mut session = Session::default();
        assert_eq!(session.threshold_percent(), 170);

        session.set_threshold_percent(150).unwrap();
        assert_eq!(session.config().threshold, 1.5);

        assert!(session.set_threshold_percent(50).is_err());
        assert!(session.set_threshold_percent(600).is_err());
        assert!(session.set_threshold_percent(100).is_err());
        // Failed updates keep the previous value
        assert_eq!(session.threshold_percent(), 150);
    }

    #[test]
    fn session_selection_and_horizon() {
        let mut session = Session::new(PipelineConfig::default()).unwrap();
        session.select_title(Some("Alpha".to_string()));
        assert_eq!(
            session.config().selection(),
            ContentSelection::Title("Alpha".to_string())
        );
        session.set_horizon(30).unwrap();
        assert_eq!(session.config().forecast_options().horizon, 30);
        assert!(session.set_horizon(0).is_err());
        assert!(session.set_horizon(200_000_000).is_err());
        assert_eq!(session.config().forecast_horizon_days, 30);
    }

    #[test]
    fn session_date_filter_keeps_previous_on_inverted_range() {
        let mut session = Session::default();
        let january = DateFilter::between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        session.set_date_filter(january).unwrap();
        assert_eq!(session.config().date_filter, january);

        let inverted = DateFilter::between(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        assert!(matches!(
            session.set_date_filter(inverted),
            Err(EventError::InvalidParameter(_))
        ));
        assert_eq!(session.config().date_filter, january);
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("EVENTCAST_THRESHOLD", "1.3"),
            ("EVENTCAST_HOLIDAY_COUNTRY", ""),
            ("EVENTCAST_TITLE", "Alpha"),
            ("EVENTCAST_MODEL", "seasonal_naive"),
            ("EVENTCAST_HORIZON_DAYS", " 15 "),
        ]));
        assert_eq!(config.threshold, 1.3);
        assert_eq!(config.holiday_country_code, None);
        assert_eq!(config.grouping_key.as_deref(), Some("Alpha"));
        assert_eq!(config.model, ForecastModel::SeasonalNaive);
        assert_eq!(config.forecast_horizon_days, 15);
    }

    #[test]
    fn unparseable_or_missing_values_fall_back_to_defaults() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("EVENTCAST_THRESHOLD", "high"),
            ("EVENTCAST_MODEL", "prophet"),
            ("EVENTCAST_TITLE", "   "),
        ]));
        assert_eq!(config, PipelineConfig::default());
    }
}
