//! Partition types
//!
//! A time window is the unit a windowed query is sliced into.

use chrono::NaiveDate;
use std::fmt;

/// Date format the research API expects for `start_date` / `end_date`
pub const API_DATE_FORMAT: &str = "%Y%m%d";

/// An inclusive `[start, end]` date range sent with a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Create a new window
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Start date in API format (`YYYYMMDD`)
    pub fn start_param(&self) -> String {
        self.start.format(API_DATE_FORMAT).to_string()
    }

    /// End date in API format (`YYYYMMDD`)
    pub fn end_param(&self) -> String {
        self.end.format(API_DATE_FORMAT).to_string()
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_param(), self.end_param())
    }
}
