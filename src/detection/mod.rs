//! Event detection for daily revenue series.
//!
//! This module provides:
//! - Per-date rolling means and event flags
//! - Weekday buckets of event counts and excess ratios

mod events;
mod weekday;

pub use events::{
    compute_rolling_stats, detect_events, is_event, DailyStat, EventReport, RollingStats,
    ROLLING_WINDOW,
};
pub use weekday::{weekday_name, WeekdayBucket, WeekdaySummary, WEEKDAY_ORDER};
