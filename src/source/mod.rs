//! Raw row loading from injected, read-only data providers.
//!
//! The core never owns connection lifecycle or credentials: callers hand in
//! anything implementing [`DataSource`].

mod cache;
mod memory;
mod sqlite;

pub use cache::CachedSource;
pub use memory::InMemorySource;
pub use sqlite::{SqliteSource, SqliteTables};

use crate::error::{EventError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Daily coin revenue of one content title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRow {
    pub date: NaiveDate,
    pub title: String,
    pub coins: f64,
}

/// Daily payment totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub date: NaiveDate,
    pub amount: f64,
    /// Number of first-time payers that day, when the source tracks it.
    pub first_time_count: Option<u64>,
}

/// Provider of content and payment rows.
pub trait DataSource {
    fn content_rows(&self) -> Result<Vec<ContentRow>>;

    fn payment_rows(&self) -> Result<Vec<PaymentRow>>;

    /// Text of the content query; identifies the rows for memoization.
    fn content_query(&self) -> &str;

    /// Text of the payment query.
    fn payment_query(&self) -> &str;
}

impl<S: DataSource + ?Sized> DataSource for &S {
    fn content_rows(&self) -> Result<Vec<ContentRow>> {
        (**self).content_rows()
    }

    fn payment_rows(&self) -> Result<Vec<PaymentRow>> {
        (**self).payment_rows()
    }

    fn content_query(&self) -> &str {
        (**self).content_query()
    }

    fn payment_query(&self) -> &str {
        (**self).payment_query()
    }
}

/// Normalize a date column value to a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`
/// and RFC 3339 timestamps; the time of day is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(EventError::TimestampError(format!(
        "unrecognized date '{}'",
        raw
    )))
}

/// Sorted unique titles, for building a selection list.
pub fn content_titles(rows: &[ContentRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.title.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_accepts_common_layouts() {
        assert_eq!(parse_date("2024-03-05").unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date(" 2024-03-05 ").unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05 13:45:00").unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T00:00:00.000").unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05T23:00:00+02:00").unwrap(), d(2024, 3, 5));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(matches!(
            parse_date("05/03/2024"),
            Err(EventError::TimestampError(_))
        ));
        assert!(parse_date("").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn titles_are_sorted_and_unique() {
        let row = |title: &str| ContentRow {
            date: d(2024, 1, 1),
            title: title.to_string(),
            coins: 1.0,
        };
        let rows = vec![row("Zeta"), row("Alpha"), row("Zeta"), row("Mid")];
        assert_eq!(content_titles(&rows), vec!["Alpha", "Mid", "Zeta"]);
    }
}
