//! Report time windows.
//!
//! Every constructor produces a window starting at midnight of its first day
//! and ending at 23:59:59 of its last day, in local time, so single-day
//! windows are non-empty and multi-day windows include both endpoints.

use crate::error::{ReportError, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: NaiveDateTime,
    pub until: NaiveDateTime,
}

impl TimeWindow {
    /// Window covering the whole days `first..=last`.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        if first > last {
            return Err(ReportError::invalid_range(format!(
                "start date {} is after end date {}",
                first, last
            )));
        }

        match (first.and_hms_opt(0, 0, 0), last.and_hms_opt(23, 59, 59)) {
            (Some(since), Some(until)) => Ok(Self { since, until }),
            _ => Err(ReportError::invalid_range(format!(
                "cannot build day bounds for {} to {}",
                first, last
            ))),
        }
    }

    pub fn today() -> Result<Self> {
        Self::today_from(local_today())
    }

    pub fn today_from(today: NaiveDate) -> Result<Self> {
        Self::from_dates(today, today)
    }

    pub fn yesterday() -> Result<Self> {
        Self::yesterday_from(local_today())
    }

    pub fn yesterday_from(today: NaiveDate) -> Result<Self> {
        let yesterday = today - Duration::days(1);
        Self::from_dates(yesterday, yesterday)
    }

    /// Monday through Sunday of the current week.
    pub fn this_week() -> Result<Self> {
        Self::this_week_from(local_today())
    }

    pub fn this_week_from(today: NaiveDate) -> Result<Self> {
        let monday = week_start(today);
        Self::from_dates(monday, monday + Duration::days(6))
    }

    pub fn last_week() -> Result<Self> {
        Self::last_week_from(local_today())
    }

    pub fn last_week_from(today: NaiveDate) -> Result<Self> {
        let monday = week_start(today) - Duration::days(7);
        Self::from_dates(monday, monday + Duration::days(6))
    }

    /// The last `days` days, today included.
    pub fn last_n_days(days: i64) -> Result<Self> {
        Self::last_n_days_from(local_today(), days)
    }

    pub fn last_n_days_from(today: NaiveDate, days: i64) -> Result<Self> {
        if days < 1 {
            return Err(ReportError::invalid_range(format!(
                "days must be at least 1, got {}",
                days
            )));
        }

        let first = days_before(today, days - 1)
            .ok_or_else(|| ReportError::invalid_range(format!("days out of range, got {}", days)))?;
        Self::from_dates(first, today)
    }

    /// The `days` days immediately before [`TimeWindow::last_n_days`].
    pub fn previous_n_days(days: i64) -> Result<Self> {
        Self::previous_n_days_from(local_today(), days)
    }

    pub fn previous_n_days_from(today: NaiveDate, days: i64) -> Result<Self> {
        let current = Self::last_n_days_from(today, days)?;
        let last = days_before(current.since.date(), 1)
            .ok_or_else(|| ReportError::invalid_range(format!("days out of range, got {}", days)))?;
        Self::last_n_days_from(last, days)
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::invalid_range(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ReportError::invalid_range(format!("invalid month {}-{:02}", year, month))
        })?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last = next_month
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| {
                ReportError::invalid_range(format!("invalid month {}-{:02}", year, month))
            })?;

        Self::from_dates(first, last)
    }

    /// Explicit `YYYY-MM-DD` bounds, both inclusive.
    pub fn custom(from: &str, to: &str) -> Result<Self> {
        let first = parse_day(from)?;
        let last = parse_day(to)?;
        Self::from_dates(first, last)
    }

    pub fn contains(&self, instant: &DateTime<Local>) -> bool {
        let local = instant.naive_local();
        local >= self.since && local <= self.until
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.since.date();
        let last = self.until.date();
        if first == last {
            write!(f, "{}", first)
        } else {
            write!(f, "{} to {}", first, last)
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn days_before(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|span| day.checked_sub_signed(span))
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ReportError::invalid_range(format!(
            "invalid date '{}', expected YYYY-MM-DD: {}",
            value, e
        ))
    })
}
