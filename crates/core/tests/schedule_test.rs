use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use pretty_assertions::assert_eq;
use slotbook_core::schedule::{
    local_date, parse_zone, resolve_local, weekday_from_index, weekday_index, LocalTimeError,
    WeeklyWindow,
};

const NEW_YORK: &str = "America/New_York";

fn zone(name: &str) -> Tz {
    parse_zone(name).expect("known zone")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[test]
fn test_parse_zone_rejects_unknown_name() {
    assert_eq!(
        parse_zone("Mars/Olympus_Mons"),
        Err(LocalTimeError::UnknownZone("Mars/Olympus_Mons".to_string()))
    );
}

#[test]
fn test_resolve_local_standard_time() {
    // January in New York is EST (UTC-5).
    let resolved = resolve_local(date(2026, 1, 12), time(9, 0), zone(NEW_YORK)).unwrap();
    assert_eq!(resolved, utc("2026-01-12T14:00:00Z"));
}

#[test]
fn test_resolve_local_daylight_time() {
    // September in New York is EDT (UTC-4).
    let resolved = resolve_local(date(2026, 9, 7), time(9, 0), zone(NEW_YORK)).unwrap();
    assert_eq!(resolved, utc("2026-09-07T13:00:00Z"));
}

#[test]
fn test_spring_forward_gap_is_rejected() {
    // 2026-03-08 02:30 does not exist in New York; clocks jump 02:00 -> 03:00.
    let result = resolve_local(date(2026, 3, 8), time(2, 30), zone(NEW_YORK));
    assert_eq!(
        result,
        Err(LocalTimeError::Nonexistent {
            date: date(2026, 3, 8),
            time: time(2, 30),
            zone: zone(NEW_YORK),
        })
    );
}

#[test]
fn test_fall_back_ambiguity_takes_earlier_offset() {
    // 2026-11-01 01:30 happens twice in New York; the earlier occurrence is
    // still EDT (UTC-4), i.e. 05:30 UTC rather than 06:30 UTC.
    let resolved = resolve_local(date(2026, 11, 1), time(1, 30), zone(NEW_YORK)).unwrap();
    assert_eq!(resolved, utc("2026-11-01T05:30:00Z"));
}

#[test]
fn test_same_wall_clock_differs_across_dst_boundary() {
    // The recurring window is wall-clock precisely so its UTC position moves
    // with the zone's offset; a fixed offset would drift at the transitions.
    let winter = resolve_local(date(2026, 1, 12), time(9, 0), zone(NEW_YORK)).unwrap();
    let summer = resolve_local(date(2026, 7, 13), time(9, 0), zone(NEW_YORK)).unwrap();

    assert_eq!(winter, utc("2026-01-12T14:00:00Z"));
    assert_eq!(summer, utc("2026-07-13T13:00:00Z"));
}

#[test]
fn test_local_date_depends_on_zone_not_offset_spelling() {
    // The same instant spelled with different offsets is the same UTC value,
    // and therefore the same business-local calendar date.
    let as_utc: DateTime<Utc> = "2026-09-08T01:00:00Z".parse().unwrap();
    let as_offset = DateTime::parse_from_rfc3339("2026-09-07T21:00:00-04:00")
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(as_utc, as_offset);

    // 01:00 UTC on the 8th is still the evening of the 7th in New York.
    assert_eq!(local_date(as_utc, zone(NEW_YORK)), date(2026, 9, 7));
}

#[test]
fn test_weekday_index_round_trip() {
    for (weekday, index) in [
        (Weekday::Mon, 0),
        (Weekday::Tue, 1),
        (Weekday::Wed, 2),
        (Weekday::Thu, 3),
        (Weekday::Fri, 4),
        (Weekday::Sat, 5),
        (Weekday::Sun, 6),
    ] {
        assert_eq!(weekday_index(weekday), index);
        assert_eq!(weekday_from_index(index), Some(weekday));
    }
    assert_eq!(weekday_from_index(7), None);
    assert_eq!(weekday_from_index(-1), None);
}

#[test]
fn test_weekly_window_rejects_inverted_range() {
    let result = WeeklyWindow::new(Weekday::Mon, time(17, 0), time(9, 0));
    assert_eq!(
        result,
        Err(LocalTimeError::InvertedWindow {
            start: time(17, 0),
            end: time(9, 0),
        })
    );
}

#[test]
fn test_weekly_window_resolve() {
    let window = WeeklyWindow::new(Weekday::Mon, time(9, 0), time(17, 0)).unwrap();
    let resolved = window.resolve(date(2026, 9, 7), zone(NEW_YORK)).unwrap();

    assert_eq!(resolved.start, utc("2026-09-07T13:00:00Z"));
    assert_eq!(resolved.end, utc("2026-09-07T21:00:00Z"));
}

#[test]
fn test_weekly_window_resolve_fails_in_gap() {
    // A window starting inside the spring-forward gap cannot be resolved.
    let window = WeeklyWindow::new(Weekday::Sun, time(2, 30), time(4, 0)).unwrap();
    let result = window.resolve(date(2026, 3, 8), zone(NEW_YORK));
    assert!(matches!(result, Err(LocalTimeError::Nonexistent { .. })));
}

#[test]
fn test_weekly_window_encloses() {
    let outer = WeeklyWindow::new(Weekday::Mon, time(9, 0), time(17, 0)).unwrap();
    let inner = WeeklyWindow::new(Weekday::Mon, time(12, 0), time(13, 0)).unwrap();
    let other_day = WeeklyWindow::new(Weekday::Tue, time(12, 0), time(13, 0)).unwrap();
    let spills = WeeklyWindow::new(Weekday::Mon, time(16, 0), time(18, 0)).unwrap();

    assert!(outer.encloses(&inner));
    assert!(outer.encloses(&outer));
    assert!(!outer.encloses(&other_day));
    assert!(!outer.encloses(&spills));
}
