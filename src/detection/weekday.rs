//! Weekday buckets of event statistics.

use crate::detection::events::RollingStats;
use chrono::Weekday;
use serde::Serialize;

/// Display order of the buckets, Sunday first.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Full English name of a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Event statistics for one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayBucket {
    pub weekday: Weekday,
    pub name: &'static str,
    /// Number of event days falling on this weekday.
    pub event_count: usize,
    /// Mean of value / rolling mean over this weekday's event days, 0 when there are none.
    pub average_excess_ratio: f64,
}

impl WeekdayBucket {
    fn empty(weekday: Weekday) -> Self {
        Self {
            weekday,
            name: weekday_name(weekday),
            event_count: 0,
            average_excess_ratio: 0.0,
        }
    }
}

/// All seven weekday buckets, always present even when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySummary {
    buckets: [WeekdayBucket; 7],
}

impl Default for WeekdaySummary {
    fn default() -> Self {
        Self {
            buckets: WEEKDAY_ORDER.map(WeekdayBucket::empty),
        }
    }
}

impl WeekdaySummary {
    /// Group the event days of `stats` by calendar weekday.
    pub fn from_stats(stats: &RollingStats) -> Self {
        let mut summary = Self::default();
        let mut ratio_sums = [0.0_f64; 7];
        let mut ratio_counts = [0_usize; 7];

        for stat in stats.events() {
            let slot = Self::slot(stat.weekday);
            summary.buckets[slot].event_count += 1;
            if let Some(ratio) = stat.excess_ratio() {
                ratio_sums[slot] += ratio;
                ratio_counts[slot] += 1;
            }
        }

        for (slot, bucket) in summary.buckets.iter_mut().enumerate() {
            bucket.average_excess_ratio = if ratio_counts[slot] > 0 {
                ratio_sums[slot] / ratio_counts[slot] as f64
            } else {
                0.0
            };
        }

        summary
    }

    fn slot(weekday: Weekday) -> usize {
        weekday.num_days_from_sunday() as usize
    }

    pub fn buckets(&self) -> &[WeekdayBucket; 7] {
        &self.buckets
    }

    pub fn bucket(&self, weekday: Weekday) -> &WeekdayBucket {
        &self.buckets[Self::slot(weekday)]
    }

    pub fn event_count(&self, weekday: Weekday) -> usize {
        self.bucket(weekday).event_count
    }

    pub fn average_excess_ratio(&self, weekday: Weekday) -> f64 {
        self.bucket(weekday).average_excess_ratio
    }

    pub fn total_events(&self) -> usize {
        self.buckets.iter().map(|b| b.event_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DailySeriesBuilder;
    use crate::detection::events::compute_rolling_stats;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn buckets_follow_sunday_first_order() {
        let summary = WeekdaySummary::default();
        let names: Vec<_> = summary.buckets().iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec!["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
        );
        assert!(summary.buckets().iter().all(|b| b.event_count == 0));
        assert_eq!(summary.total_events(), 0);
    }

    #[test]
    fn repeated_weekly_spike_lands_in_one_bucket() {
        // 2024-01-01 is a Monday; spike every Wednesday
        let values: Vec<f64> = (0..28)
            .map(|i| if i % 7 == 2 { 40.0 } else { 10.0 })
            .collect();
        let series = DailySeriesBuilder::new()
            .contiguous_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values)
            .build()
            .unwrap();
        let stats = compute_rolling_stats(&series, 1.5).unwrap();
        let summary = WeekdaySummary::from_stats(&stats);

        assert_eq!(summary.event_count(Weekday::Wed), 4);
        assert_eq!(summary.total_events(), stats.event_count());
        assert_eq!(summary.average_excess_ratio(Weekday::Mon), 0.0);

        // First spike sees a shrunk six-day window, the rest see (6 * 10 + 40) / 7
        let edge_ratio = 40.0 / 15.0;
        let interior_ratio = 40.0 / (100.0 / 7.0);
        assert_relative_eq!(stats.stats()[9].excess_ratio().unwrap(), interior_ratio);
        assert_relative_eq!(
            summary.average_excess_ratio(Weekday::Wed),
            (edge_ratio + 3.0 * interior_ratio) / 4.0,
            epsilon = 1e-12
        );
    }
}
