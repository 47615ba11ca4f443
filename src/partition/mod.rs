//! Partition routing module
//!
//! Windowed endpoints only accept queries spanning a limited number of days,
//! so a long period is split into consecutive date windows that are drained
//! one after another.

mod types;
mod windows;

pub use types::{TimeWindow, API_DATE_FORMAT};
pub use windows::{parse_date, DateWindowRouter, DEFAULT_WINDOW_DAYS};

#[cfg(test)]
mod tests;
