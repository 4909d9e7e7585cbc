use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use pretty_assertions::assert_eq;
use slotbook_core::interval::Interval;
use slotbook_core::schedule::{parse_zone, WeeklyWindow};
use slotbook_core::slots::{candidate_starts, check_within_windows, WindowViolation};

fn zone() -> Tz {
    parse_zone("America/New_York").unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn interval(start: &str, end: &str) -> Interval {
    Interval::new(utc(start), utc(end)).unwrap()
}

/// Monday 09:00-17:00 New York resolved for 2026-09-07 (EDT, UTC-4).
fn monday_availability() -> Interval {
    let window = WeeklyWindow::new(Weekday::Mon, time(9, 0), time(17, 0)).unwrap();
    let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    window.resolve(monday, zone()).unwrap()
}

#[test]
fn test_open_monday_yields_sixteen_half_hour_slots() {
    let slots: Vec<_> = candidate_starts(
        monday_availability(),
        &[],
        Duration::minutes(30),
        Duration::minutes(30),
    )
    .collect();

    assert_eq!(slots.len(), 16);
    // 09:00 local is 13:00 UTC in EDT.
    assert_eq!(slots[0], utc("2026-09-07T13:00:00Z"));
    assert_eq!(slots[1], utc("2026-09-07T13:30:00Z"));
    // The last candidate starts 16:30 local and ends exactly at close.
    assert_eq!(slots[15], utc("2026-09-07T20:30:00Z"));
}

#[test]
fn test_lunch_block_keeps_boundary_touching_candidate() {
    // 12:00-13:00 local unavailability, i.e. 16:00-17:00 UTC.
    let lunch = interval("2026-09-07T16:00:00Z", "2026-09-07T17:00:00Z");

    let slots: Vec<_> = candidate_starts(
        monday_availability(),
        &[lunch],
        Duration::minutes(30),
        Duration::minutes(30),
    )
    .collect();

    // 11:30 local ends exactly at the block start and must be included.
    assert!(slots.contains(&utc("2026-09-07T15:30:00Z")));
    // 12:00 and 12:30 local fall inside the block and must be excluded.
    assert!(!slots.contains(&utc("2026-09-07T16:00:00Z")));
    assert!(!slots.contains(&utc("2026-09-07T16:30:00Z")));
    // The walk resumes at 13:00 local.
    assert!(slots.contains(&utc("2026-09-07T17:00:00Z")));
    assert_eq!(slots.len(), 14);
}

#[test]
fn test_existing_booking_blocks_candidates_like_unavailability() {
    // A 10:00-10:45 local booking removes the 10:00 and 10:30 starts; 09:30
    // ends exactly at the booking and stays, and the free remainder restarts
    // the walk at 10:45.
    let booked = interval("2026-09-07T14:00:00Z", "2026-09-07T14:45:00Z");

    let slots: Vec<_> = candidate_starts(
        monday_availability(),
        &[booked],
        Duration::minutes(30),
        Duration::minutes(30),
    )
    .collect();

    assert!(slots.contains(&utc("2026-09-07T13:00:00Z")));
    assert!(slots.contains(&utc("2026-09-07T13:30:00Z")));
    assert!(!slots.contains(&utc("2026-09-07T14:00:00Z")));
    assert!(!slots.contains(&utc("2026-09-07T14:30:00Z")));
    assert!(slots.contains(&utc("2026-09-07T14:45:00Z")));
}

#[test]
fn test_duration_longer_than_free_gap_is_skipped() {
    let availability = interval("2026-09-07T13:00:00Z", "2026-09-07T14:00:00Z");

    let slots: Vec<_> = candidate_starts(
        availability,
        &[],
        Duration::minutes(30),
        Duration::minutes(90),
    )
    .collect();

    assert!(slots.is_empty());
}

#[test]
fn test_non_positive_duration_yields_nothing() {
    let slots: Vec<_> = candidate_starts(
        monday_availability(),
        &[],
        Duration::minutes(30),
        Duration::zero(),
    )
    .collect();

    assert!(slots.is_empty());
}

#[test]
fn test_check_within_windows_accepts_contained_interval() {
    let requested = interval("2026-09-07T14:00:00Z", "2026-09-07T14:30:00Z");
    let result = check_within_windows(requested, &[monday_availability()], &[]);
    assert_eq!(result, Ok(()));
}

#[test]
fn test_check_within_windows_rejects_outside_availability() {
    // 08:30-09:30 local straddles opening time.
    let requested = interval("2026-09-07T12:30:00Z", "2026-09-07T13:30:00Z");
    let result = check_within_windows(requested, &[monday_availability()], &[]);
    assert_eq!(result, Err(WindowViolation::OutsideAvailability));
}

#[test]
fn test_check_within_windows_rejects_unavailability_overlap() {
    let lunch = interval("2026-09-07T16:00:00Z", "2026-09-07T17:00:00Z");
    // 12:30-13:30 local overlaps the block.
    let requested = interval("2026-09-07T16:30:00Z", "2026-09-07T17:30:00Z");

    let result = check_within_windows(requested, &[monday_availability()], &[lunch]);
    assert_eq!(result, Err(WindowViolation::InsideUnavailability));
}

#[test]
fn test_check_within_windows_boundary_touch_is_allowed() {
    let lunch = interval("2026-09-07T16:00:00Z", "2026-09-07T17:00:00Z");
    // 11:30-12:00 local ends exactly where the block starts.
    let requested = interval("2026-09-07T15:30:00Z", "2026-09-07T16:00:00Z");

    let result = check_within_windows(requested, &[monday_availability()], &[lunch]);
    assert_eq!(result, Ok(()));
}

#[test]
fn test_check_within_windows_no_availability_at_all() {
    let requested = interval("2026-09-07T14:00:00Z", "2026-09-07T14:30:00Z");
    let result = check_within_windows(requested, &[], &[]);
    assert_eq!(result, Err(WindowViolation::OutsideAvailability));
}
