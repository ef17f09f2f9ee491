//! Time utilities: timezone-aware month intervals with a configurable start day.
//!
//! A month interval starts at local midnight of the start day and ends one
//! nanosecond before the next interval starts. Start days that do not exist
//! in a month (29..=31 in short months) are clamped to that month's last day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("month start day must be within 1..=31, got {0}")]
    InvalidMonthStartDay(u32),
    #[error("invalid timezone: {0}")]
    InvalidTimeZone(String),
    #[error("local midnight of {date} does not exist in {tz}")]
    InvalidLocalTime { date: NaiveDate, tz: Tz },
}

/// Day of month on which every interval begins (1..=31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MonthStartDay(u32);

impl MonthStartDay {
    pub const FIRST: MonthStartDay = MonthStartDay(1);

    pub fn new(day: u32) -> Result<Self, TimeError> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(TimeError::InvalidMonthStartDay(day))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for MonthStartDay {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for MonthStartDay {
    type Error = TimeError;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<MonthStartDay> for u32 {
    fn from(day: MonthStartDay) -> u32 {
        day.0
    }
}

/// Parse an IANA zone name like "Asia/Yerevan".
pub fn parse_time_zone(name: &str) -> Result<Tz, TimeError> {
    name.parse()
        .map_err(|_| TimeError::InvalidTimeZone(name.to_string()))
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Start date of the interval beginning in `year`/`month`, clamped to the month's last day.
pub fn month_start_date(year: i32, month: u32, start_day: MonthStartDay) -> NaiveDate {
    let day = start_day.get().min(last_day_of_month(year, month));
    // day is within the month by construction
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// `[start, next_start)` dates of the interval that contains `date`.
pub fn interval_dates(date: NaiveDate, start_day: MonthStartDay) -> (NaiveDate, NaiveDate) {
    let anchor = month_start_date(date.year(), date.month(), start_day);
    let start = if date < anchor {
        let (py, pm) = prev_month(date.year(), date.month());
        month_start_date(py, pm, start_day)
    } else {
        anchor
    };
    let (ny, nm) = next_month(start.year(), start.month());
    (start, month_start_date(ny, nm, start_day))
}

/// First instant of `date` in `tz`.
///
/// When a DST gap swallows midnight the first existing instant of the day is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, TimeError> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .ok_or(TimeError::InvalidLocalTime { date, tz })
}

/// Inclusive `[start, end]` boundaries of one month interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl MonthInterval {
    /// The interval that contains `date`.
    pub fn containing(date: NaiveDate, start_day: MonthStartDay, tz: Tz) -> Result<Self, TimeError> {
        let (start, next) = interval_dates(date, start_day);
        let start = local_midnight(start, tz)?;
        let next = local_midnight(next, tz)?;
        Ok(Self {
            start,
            end: next - Duration::nanoseconds(1),
        })
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}
