//! Country public-holiday calendars used as a forecasting regressor.

use crate::error::{EventError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Country codes with built-in holiday rules.
pub const SUPPORTED_COUNTRIES: [&str; 4] = ["FR", "DE", "GB", "US"];

/// A named public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// Public holidays of one country over a range of years.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HolidayCalendar {
    country: String,
    holidays: BTreeMap<NaiveDate, &'static str>,
}

impl HolidayCalendar {
    /// Build the calendar for `code` (ISO 3166 alpha-2, case-insensitive).
    pub fn for_country(code: &str, years: RangeInclusive<i32>) -> Result<Self> {
        let country = code.trim().to_ascii_uppercase();
        let rules: fn(i32) -> Vec<Holiday> = match country.as_str() {
            "FR" => france,
            "DE" => germany,
            "GB" => great_britain,
            "US" => united_states,
            _ => return Err(EventError::UnknownHolidayCountry(code.to_string())),
        };

        let holidays = years
            .flat_map(rules)
            .map(|h| (h.date, h.name))
            .collect();

        Ok(Self { country, holidays })
    }

    /// Calendar spanning every year touched by `start..=end`.
    pub fn covering(code: &str, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::for_country(code, start.year()..=end.year())
    }

    /// Whether `code` has built-in rules.
    pub fn is_supported(code: &str) -> bool {
        let upper = code.trim().to_ascii_uppercase();
        SUPPORTED_COUNTRIES.contains(&upper.as_str())
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn name_of(&self, date: NaiveDate) -> Option<&'static str> {
        self.holidays.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    pub fn holidays(&self) -> impl Iterator<Item = Holiday> + '_ {
        self.holidays
            .iter()
            .map(|(&date, &name)| Holiday { date, name })
    }

    /// 1.0 on holidays, 0.0 otherwise, one entry per date.
    pub fn indicator(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates
            .iter()
            .map(|d| if self.is_holiday(*d) { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Western Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Only called with rule-generated, always-valid dates
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n).unwrap_or(NaiveDate::MIN)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let mut date = ymd(next_year, next_month, 1) - Duration::days(1);
    while date.weekday() != weekday {
        date -= Duration::days(1);
    }
    date
}

fn holiday(date: NaiveDate, name: &'static str) -> Holiday {
    Holiday { date, name }
}

fn france(year: i32) -> Vec<Holiday> {
    let easter = easter_sunday(year);
    vec![
        holiday(ymd(year, 1, 1), "New Year's Day"),
        holiday(easter + Duration::days(1), "Easter Monday"),
        holiday(ymd(year, 5, 1), "Labour Day"),
        holiday(ymd(year, 5, 8), "Victory in Europe Day"),
        holiday(easter + Duration::days(39), "Ascension Day"),
        holiday(easter + Duration::days(50), "Whit Monday"),
        holiday(ymd(year, 7, 14), "National Day"),
        holiday(ymd(year, 8, 15), "Assumption Day"),
        holiday(ymd(year, 11, 1), "All Saints' Day"),
        holiday(ymd(year, 11, 11), "Armistice Day"),
        holiday(ymd(year, 12, 25), "Christmas Day"),
    ]
}

fn germany(year: i32) -> Vec<Holiday> {
    let easter = easter_sunday(year);
    vec![
        holiday(ymd(year, 1, 1), "New Year's Day"),
        holiday(easter - Duration::days(2), "Good Friday"),
        holiday(easter + Duration::days(1), "Easter Monday"),
        holiday(ymd(year, 5, 1), "Labour Day"),
        holiday(easter + Duration::days(39), "Ascension Day"),
        holiday(easter + Duration::days(50), "Whit Monday"),
        holiday(ymd(year, 10, 3), "German Unity Day"),
        holiday(ymd(year, 12, 25), "Christmas Day"),
        holiday(ymd(year, 12, 26), "Second Day of Christmas"),
    ]
}

fn great_britain(year: i32) -> Vec<Holiday> {
    let easter = easter_sunday(year);
    vec![
        holiday(ymd(year, 1, 1), "New Year's Day"),
        holiday(easter - Duration::days(2), "Good Friday"),
        holiday(easter + Duration::days(1), "Easter Monday"),
        holiday(nth_weekday(year, 5, Weekday::Mon, 1), "Early May Bank Holiday"),
        holiday(last_weekday(year, 5, Weekday::Mon), "Spring Bank Holiday"),
        holiday(last_weekday(year, 8, Weekday::Mon), "Summer Bank Holiday"),
        holiday(ymd(year, 12, 25), "Christmas Day"),
        holiday(ymd(year, 12, 26), "Boxing Day"),
    ]
}

fn united_states(year: i32) -> Vec<Holiday> {
    let mut days = vec![
        holiday(ymd(year, 1, 1), "New Year's Day"),
        holiday(nth_weekday(year, 1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
        holiday(nth_weekday(year, 2, Weekday::Mon, 3), "Washington's Birthday"),
        holiday(last_weekday(year, 5, Weekday::Mon), "Memorial Day"),
        holiday(ymd(year, 7, 4), "Independence Day"),
        holiday(nth_weekday(year, 9, Weekday::Mon, 1), "Labor Day"),
        holiday(nth_weekday(year, 10, Weekday::Mon, 2), "Columbus Day"),
        holiday(ymd(year, 11, 11), "Veterans Day"),
        holiday(nth_weekday(year, 11, Weekday::Thu, 4), "Thanksgiving"),
        holiday(ymd(year, 12, 25), "Christmas Day"),
    ];
    if year >= 2021 {
        days.push(holiday(ymd(year, 6, 19), "Juneteenth National Independence Day"));
    }
    days
}
