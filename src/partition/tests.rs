//! Tests for partition module

use super::*;
use chrono::{Datelike, NaiveDate};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// TimeWindow Tests
// ============================================================================

#[test]
fn test_time_window_params() {
    let window = TimeWindow::new(date(2025, 1, 1), date(2025, 1, 30));
    assert_eq!(window.start_param(), "20250101");
    assert_eq!(window.end_param(), "20250130");
    assert_eq!(window.days(), 30);
    assert_eq!(window.to_string(), "20250101 to 20250130");
}

// ============================================================================
// DateWindowRouter Tests
// ============================================================================

#[test]
fn test_router_splits_into_thirty_day_windows() {
    let router = DateWindowRouter::new(date(2024, 1, 1), date(2024, 3, 1), 30).unwrap();
    let windows = router.windows();

    assert_eq!(
        windows,
        vec![
            TimeWindow::new(date(2024, 1, 1), date(2024, 1, 30)),
            TimeWindow::new(date(2024, 1, 31), date(2024, 2, 29)),
            TimeWindow::new(date(2024, 3, 1), date(2024, 3, 1)),
        ]
    );
    assert!(windows.iter().all(|w| w.days() <= 30));
}

#[test]
fn test_router_single_day() {
    let router = DateWindowRouter::new(date(2024, 5, 5), date(2024, 5, 5), 30).unwrap();
    assert_eq!(
        router.windows(),
        vec![TimeWindow::new(date(2024, 5, 5), date(2024, 5, 5))]
    );
}

#[test]
fn test_router_inverted_range_is_empty() {
    let router = DateWindowRouter::new(date(2024, 5, 6), date(2024, 5, 5), 30).unwrap();
    assert!(router.windows().is_empty());
}

#[test]
fn test_router_rejects_zero_days() {
    assert!(DateWindowRouter::new(date(2024, 1, 1), date(2024, 1, 2), 0).is_err());
}

#[test_case(31; "one past the api maximum")]
#[test_case(4_000_000_000; "far past the calendar")]
fn test_router_rejects_oversized_windows(days: u32) {
    assert!(DateWindowRouter::new(date(2024, 1, 1), date(2024, 12, 31), days).is_err());
}

#[test]
fn test_router_stops_at_calendar_end() {
    let start = NaiveDate::MAX - chrono::Duration::days(40);
    let router = DateWindowRouter::new(start, NaiveDate::MAX, 30).unwrap();
    let windows = router.windows();

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[1].end, NaiveDate::MAX);
}

#[test]
fn test_router_covers_last_representable_year() {
    let router =
        DateWindowRouter::for_year(NaiveDate::MAX.year(), date(2025, 1, 1), 30).unwrap();
    assert_eq!(router.windows().last().unwrap().end, NaiveDate::MAX);
}

#[test]
fn test_router_windows_are_contiguous() {
    let router = DateWindowRouter::new(date(2023, 1, 1), date(2023, 12, 31), 7).unwrap();
    let windows = router.windows();

    assert_eq!(windows.first().unwrap().start, date(2023, 1, 1));
    assert_eq!(windows.last().unwrap().end, date(2023, 12, 31));
    for pair in windows.windows(2) {
        assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
    }
}

#[test]
fn test_for_past_year_covers_whole_year() {
    let router = DateWindowRouter::for_year(2023, date(2025, 6, 15), 30).unwrap();
    let windows = router.windows();

    assert_eq!(windows.len(), 13);
    assert_eq!(windows[0].start, date(2023, 1, 1));
    assert_eq!(windows.last().unwrap().end, date(2023, 12, 31));
}

#[test]
fn test_for_current_year_stops_today() {
    let router = DateWindowRouter::for_year(2025, date(2025, 2, 10), 30).unwrap();
    let windows = router.windows();

    assert_eq!(
        windows,
        vec![
            TimeWindow::new(date(2025, 1, 1), date(2025, 1, 30)),
            TimeWindow::new(date(2025, 1, 31), date(2025, 2, 10)),
        ]
    );
}

#[test]
fn test_for_future_year_runs_to_december() {
    let router = DateWindowRouter::for_year(2030, date(2025, 2, 10), 30).unwrap();
    assert_eq!(router.windows().last().unwrap().end, date(2030, 12, 31));
}

// ============================================================================
// parse_date Tests
// ============================================================================

#[test_case("2025-03-04" ; "iso")]
#[test_case("20250304" ; "compact")]
#[test_case("2025/03/04" ; "slashes")]
#[test_case(" 2025-03-04 " ; "padded")]
fn test_parse_date_formats(input: &str) {
    assert_eq!(parse_date(input).unwrap(), date(2025, 3, 4));
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("March 4th").is_err());
    assert!(parse_date("2025-13-01").is_err());
}
