//! Date window router
//!
//! Slices a date range into consecutive windows no longer than the API's
//! maximum query span.

use super::types::TimeWindow;
use crate::error::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate};
use tracing::warn;

/// Longest span the video query endpoint accepts, in days
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Splits `[start, end]` into inclusive windows of at most `max_days`
#[derive(Debug, Clone)]
pub struct DateWindowRouter {
    start: NaiveDate,
    end: NaiveDate,
    max_days: u32,
}

impl DateWindowRouter {
    /// Create a router over an explicit range
    pub fn new(start: NaiveDate, end: NaiveDate, max_days: u32) -> Result<Self> {
        if max_days == 0 || max_days > DEFAULT_WINDOW_DAYS {
            return Err(Error::invalid_value(
                "window_days",
                format!("must be between 1 and {DEFAULT_WINDOW_DAYS}"),
            ));
        }

        Ok(Self {
            start,
            end,
            max_days,
        })
    }

    /// Router covering a calendar year, clipped to `today` for the current year
    pub fn for_year(year: i32, today: NaiveDate, max_days: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| Error::invalid_value("year", format!("{year} is out of range")))?;
        let end_of_year = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| Error::invalid_value("year", format!("{year} is out of range")))?;

        let end = match year.cmp(&today.year()) {
            std::cmp::Ordering::Equal => today,
            std::cmp::Ordering::Less => end_of_year,
            std::cmp::Ordering::Greater => {
                warn!("Year {year} is in the future; windows run to the end of that year");
                end_of_year
            }
        };

        Self::new(start, end, max_days)
    }

    /// Generate the windows in chronological order
    pub fn windows(&self) -> Vec<TimeWindow> {
        let mut windows = Vec::new();
        let span = Duration::days(i64::from(self.max_days) - 1);
        let mut current = self.start;

        while current <= self.end {
            let window_end = current
                .checked_add_signed(span)
                .map_or(self.end, |d| d.min(self.end));
            windows.push(TimeWindow::new(current, window_end));

            match window_end.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        windows
    }
}

/// Parse a date written as `YYYY-MM-DD`, `YYYYMMDD` or `YYYY/MM/DD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let formats = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::config(format!("Invalid date format: {s}")))
}
