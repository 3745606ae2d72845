//! Calendar-day arithmetic over `YYYY-MM-DD` civil dates.
//!
//! Everything here is pure and total: out-of-range arithmetic saturates and
//! unparseable input degrades to `None` or a zeroed result instead of
//! panicking, because callers routinely hand these functions uninitialized
//! form state.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's local civil date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date-string. `None` on anything unparseable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Weekday index with the persisted convention: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Normalize a 0-indexed month that may sit outside 0..=11 into a concrete
/// `(year, month1)` pair. `month0 = -1` is December of the previous year,
/// `month0 = 12` is January of the next, matching native date rollover.
fn roll_month(year: i32, month0: i32) -> (i32, u32) {
    let total = i64::from(year) * 12 + i64::from(month0);
    let rolled_year = total.div_euclid(12);
    let rolled_month0 = total.rem_euclid(12);
    (rolled_year as i32, rolled_month0 as u32 + 1)
}

/// Number of days in the given month. `month0` is 0-indexed and rolls over
/// into adjacent years. Zero for dates outside the supported calendar.
pub fn days_in_month(year: i32, month0: i32) -> u32 {
    let (year, month) = roll_month(year, month0);
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next_first {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 0,
    }
}

/// Weekday index (0 = Sunday) of the 1st of the given month, with the same
/// rollover as [`days_in_month`]. Zero for out-of-range input.
pub fn first_weekday_of_month(year: i32, month0: i32) -> u32 {
    let (year, month) = roll_month(year, month0);
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(weekday_index)
        .unwrap_or(0)
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

/// Sunday..Saturday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> DateRange {
    let back = u64::from(weekday_index(date));
    let start = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    DateRange { start, end }
}

/// 1st..last day of the month containing `date`.
pub fn month_range(date: NaiveDate) -> DateRange {
    let start = date.with_day(1).unwrap_or(date);
    let last_day = days_in_month(date.year(), date.month0() as i32);
    let end = date.with_day(last_day).unwrap_or(date);
    DateRange { start, end }
}

/// Position of a date within its month's weekday grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NthWeekdayInfo {
    /// 1-based occurrence index: `ceil(day_of_month / 7)`.
    pub week_num: u32,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: u32,
    /// True when this is the month's final occurrence of the weekday.
    pub is_last: bool,
}

/// Which occurrence of its weekday a date is ("second Tuesday"), and whether
/// it is the last one in its month.
pub fn nth_weekday_info(date: NaiveDate) -> NthWeekdayInfo {
    let week_num = (date.day() + 6) / 7;
    let weekday = weekday_index(date);
    let is_last = match date.checked_add_days(Days::new(7)) {
        Some(next) => next.month() != date.month() || next.year() != date.year(),
        None => true,
    };
    NthWeekdayInfo {
        week_num,
        weekday,
        is_last,
    }
}
