//! Series aggregation: raw rows to one value per date.

use crate::core::DailySeries;
use crate::error::{EventError, Result};
use crate::source::{ContentRow, PaymentRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which content rows feed the series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentSelection {
    /// Sum across every title.
    #[default]
    All,
    /// A single title.
    Title(String),
}

impl ContentSelection {
    pub fn matches(&self, title: &str) -> bool {
        match self {
            ContentSelection::All => true,
            ContentSelection::Title(selected) => selected == title,
        }
    }

    /// Display label, `None` for all content.
    pub fn title(&self) -> Option<&str> {
        match self {
            ContentSelection::All => None,
            ContentSelection::Title(t) => Some(t),
        }
    }
}

impl From<Option<String>> for ContentSelection {
    fn from(key: Option<String>) -> Self {
        match key {
            Some(title) => ContentSelection::Title(title),
            None => ContentSelection::All,
        }
    }
}

/// Inclusive date range filter; open ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Sum values per date and return them sorted ascending.
///
/// Non-finite values are dropped. Fails with `EmptySeries` when nothing remains.
pub fn sum_by_date<I>(rows: I) -> Result<DailySeries>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;

    for (date, value) in rows {
        if !value.is_finite() {
            dropped += 1;
            continue;
        }
        *totals.entry(date).or_insert(0.0) += value;
    }

    if dropped > 0 {
        log::warn!("dropped {} rows with non-finite values", dropped);
    }
    if totals.is_empty() {
        return Err(EventError::EmptySeries);
    }

    let (dates, values) = totals.into_iter().unzip();
    DailySeries::new(dates, values)
}

/// Daily coin series for `selection`, restricted to `filter`.
pub fn aggregate_content(
    rows: &[ContentRow],
    selection: &ContentSelection,
    filter: &DateFilter,
) -> Result<DailySeries> {
    let series = sum_by_date(
        rows.iter()
            .filter(|r| selection.matches(&r.title) && filter.contains(r.date))
            .map(|r| (r.date, r.coins)),
    )?;

    log::debug!(
        "aggregated {} days for {}",
        series.len(),
        selection.title().unwrap_or("all content")
    );
    Ok(series)
}

/// Payment revenue plus the optional first-time payer count series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSeries {
    pub amount: DailySeries,
    /// Read-only trend; never fed into detection or forecasting.
    pub first_time: Option<DailySeries>,
}

/// Daily payment series restricted to `filter`.
pub fn aggregate_payments(rows: &[PaymentRow], filter: &DateFilter) -> Result<PaymentSeries> {
    let selected: Vec<&PaymentRow> = rows.iter().filter(|r| filter.contains(r.date)).collect();

    let amount = sum_by_date(selected.iter().map(|r| (r.date, r.amount)))?;

    let counts: Vec<(NaiveDate, f64)> = selected
        .iter()
        .filter_map(|r| r.first_time_count.map(|c| (r.date, c as f64)))
        .collect();
    let first_time = if counts.is_empty() {
        None
    } else {
        Some(sum_by_date(counts)?)
    };

    Ok(PaymentSeries { amount, first_time })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn row(day: u32, title: &str, coins: f64) -> ContentRow {
        ContentRow {
            date: d(day),
            title: title.to_string(),
            coins,
        }
    }

    fn rows() -> Vec<ContentRow> {
        vec![
            row(3, "Alpha", 5.0),
            row(1, "Alpha", 10.0),
            row(1, "Beta", 2.0),
            row(2, "Beta", 7.0),
            // duplicate same-date row for one title
            row(1, "Alpha", 1.0),
        ]
    }

    #[test]
    fn all_content_sums_across_titles() {
        let series = aggregate_content(&rows(), &ContentSelection::All, &DateFilter::default()).unwrap();
        assert_eq!(series.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(series.values(), &[13.0, 7.0, 5.0]);
    }

    #[test]
    fn single_title_sums_duplicates() {
        let selection = ContentSelection::from(Some("Alpha".to_string()));
        let series = aggregate_content(&rows(), &selection, &DateFilter::default()).unwrap();
        assert_eq!(series.dates(), &[d(1), d(3)]);
        assert_eq!(series.values(), &[11.0, 5.0]);
    }

    #[test]
    fn unknown_title_is_empty_series() {
        let selection = ContentSelection::Title("Nobody".to_string());
        assert_eq!(
            aggregate_content(&rows(), &selection, &DateFilter::default()),
            Err(EventError::EmptySeries)
        );
    }

    #[test]
    fn date_filter_is_inclusive() {
        let filter = DateFilter::between(d(2), d(3));
        let series = aggregate_content(&rows(), &ContentSelection::All, &filter).unwrap();
        assert_eq!(series.values(), &[7.0, 5.0]);

        let filter = DateFilter {
            start: None,
            end: Some(d(1)),
        };
        assert!(filter.contains(d(1)));
        assert!(!filter.contains(d(2)));
        assert!(DateFilter::default().contains(d(30)));
    }

    #[test]
    fn non_finite_rows_are_dropped() {
        let rows = vec![row(1, "Alpha", f64::NAN), row(2, "Alpha", 3.0)];
        let series = aggregate_content(&rows, &ContentSelection::All, &DateFilter::default()).unwrap();
        assert_eq!(series.len(), 1);

        let rows = vec![row(1, "Alpha", f64::INFINITY)];
        assert!(aggregate_content(&rows, &ContentSelection::All, &DateFilter::default()).is_err());
    }

    #[test]
    fn payments_split_amount_and_first_time() {
        let rows = vec![
            PaymentRow {
                date: d(2),
                amount: 4.0,
                first_time_count: Some(2),
            },
            PaymentRow {
                date: d(1),
                amount: 6.0,
                first_time_count: None,
            },
        ];
        let series = aggregate_payments(&rows, &DateFilter::default()).unwrap();
        assert_eq!(series.amount.values(), &[6.0, 4.0]);
        assert_eq!(series.first_time.unwrap().values(), &[2.0]);

        assert_eq!(
            aggregate_payments(&[], &DateFilter::default()),
            Err(EventError::EmptySeries)
        );
    }
}
