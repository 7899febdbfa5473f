//! Calendar helpers shared by the ledger, payroll and analytics code.
//!
//! Ledger rows carry a full timestamp while payroll periods and analytics
//! months are expressed as whole days. Every range produced here is
//! half-open: `start <= t < end`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Rounds a monetary amount to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Timestamp bounds covering every instant of the days `start..=end`.
pub fn period_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let lower = start.and_time(NaiveTime::MIN);
    let upper = (end + Duration::days(1)).and_time(NaiveTime::MIN);
    (lower, upper)
}

/// First and last day of a calendar month, or `None` for an invalid month.
pub fn month_days(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = shift_month(year, month, 1);
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((first, next - Duration::days(1)))
}

/// Timestamp bounds of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let (first, last) = month_days(year, month)?;
    Some(period_bounds(first, last))
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    month_days(year, month).map(|(_, last)| last.day())
}

/// Moves `(year, month)` by `delta` months, carrying into the year.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` or an RFC 3339
/// timestamp (converted to UTC).
pub fn parse_flexible_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Serde adapter for optional request timestamps in any format
/// [`parse_flexible_datetime`] understands.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_flexible_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
    first: NaiveDate,
    last: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let (first, last) = month_days(year, month)?;
        Some(Self {
            year,
            month,
            first,
            last,
        })
    }

    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn days(&self) -> u32 {
        self.last.day()
    }

    /// Half-open timestamp range of the whole month.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        period_bounds(self.first, self.last)
    }

    pub fn shifted(&self, delta: i32) -> Option<Self> {
        let (year, month) = shift_month(self.year, self.month, delta);
        Self::new(year, month)
    }

    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}
