use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use slotbook_core::interval::{subtract_all, Interval};

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 instant")
}

fn interval(start: &str, end: &str) -> Interval {
    Interval::new(instant(start), instant(end)).expect("valid interval")
}

#[test]
fn test_new_rejects_empty_and_inverted() {
    let t = instant("2026-09-07T13:00:00Z");
    assert!(Interval::new(t, t).is_none());
    assert!(Interval::new(t, t - Duration::minutes(1)).is_none());
}

#[test]
fn test_duration() {
    let i = interval("2026-09-07T13:00:00Z", "2026-09-07T13:45:00Z");
    assert_eq!(i.duration(), Duration::minutes(45));
}

#[rstest]
#[case("2026-09-07T13:00:00Z", "2026-09-07T14:00:00Z", true)] // identical
#[case("2026-09-07T13:30:00Z", "2026-09-07T14:30:00Z", true)] // partial
#[case("2026-09-07T13:15:00Z", "2026-09-07T13:45:00Z", true)] // nested
#[case("2026-09-07T14:00:00Z", "2026-09-07T15:00:00Z", false)] // touching boundary
#[case("2026-09-07T15:00:00Z", "2026-09-07T16:00:00Z", false)] // disjoint
fn test_overlaps(#[case] start: &str, #[case] end: &str, #[case] expected: bool) {
    let base = interval("2026-09-07T13:00:00Z", "2026-09-07T14:00:00Z");
    let other = interval(start, end);

    assert_eq!(base.overlaps(&other), expected);
    assert_eq!(other.overlaps(&base), expected);
}

#[test]
fn test_contains() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T17:00:00Z");

    assert!(base.contains(&interval("2026-09-07T09:00:00Z", "2026-09-07T17:00:00Z")));
    assert!(base.contains(&interval("2026-09-07T10:00:00Z", "2026-09-07T11:00:00Z")));
    assert!(!base.contains(&interval("2026-09-07T08:59:00Z", "2026-09-07T10:00:00Z")));
    assert!(!base.contains(&interval("2026-09-07T16:30:00Z", "2026-09-07T17:01:00Z")));
}

#[test]
fn test_subtract_middle_splits_in_two() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T17:00:00Z");
    let block = interval("2026-09-07T12:00:00Z", "2026-09-07T13:00:00Z");

    let parts = base.subtract(&block);
    assert_eq!(
        parts,
        vec![
            interval("2026-09-07T09:00:00Z", "2026-09-07T12:00:00Z"),
            interval("2026-09-07T13:00:00Z", "2026-09-07T17:00:00Z"),
        ]
    );
}

#[test]
fn test_subtract_disjoint_block_is_noop() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T12:00:00Z");
    let block = interval("2026-09-07T12:00:00Z", "2026-09-07T13:00:00Z");

    assert_eq!(base.subtract(&block), vec![base]);
}

#[test]
fn test_subtract_covering_block_leaves_nothing() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T12:00:00Z");
    let block = interval("2026-09-07T08:00:00Z", "2026-09-07T13:00:00Z");

    assert!(base.subtract(&block).is_empty());
}

#[test]
fn test_subtract_leading_edge() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T12:00:00Z");
    let block = interval("2026-09-07T08:00:00Z", "2026-09-07T10:00:00Z");

    assert_eq!(
        base.subtract(&block),
        vec![interval("2026-09-07T10:00:00Z", "2026-09-07T12:00:00Z")]
    );
}

#[test]
fn test_subtract_all_multiple_blocks() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T17:00:00Z");
    let blocks = vec![
        interval("2026-09-07T10:00:00Z", "2026-09-07T10:30:00Z"),
        interval("2026-09-07T12:00:00Z", "2026-09-07T13:00:00Z"),
    ];

    let free = subtract_all(base, &blocks);
    assert_eq!(
        free,
        vec![
            interval("2026-09-07T09:00:00Z", "2026-09-07T10:00:00Z"),
            interval("2026-09-07T10:30:00Z", "2026-09-07T12:00:00Z"),
            interval("2026-09-07T13:00:00Z", "2026-09-07T17:00:00Z"),
        ]
    );
}

#[test]
fn test_subtract_all_no_blocks() {
    let base = interval("2026-09-07T09:00:00Z", "2026-09-07T17:00:00Z");
    assert_eq!(subtract_all(base, &[]), vec![base]);
}
