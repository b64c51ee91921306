//! Tests for half-open interval semantics.

use booking_engine::interval::{round_minutes, Interval};
use booking_engine::EngineError;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
    Interval::new(at(sh, sm), at(eh, em)).unwrap()
}

#[test]
fn zero_and_negative_durations_are_rejected() {
    assert_eq!(
        Interval::new(at(9, 0), at(9, 0)),
        Err(EngineError::InvalidInterval {
            start: at(9, 0),
            end: at(9, 0)
        })
    );
    assert!(Interval::new(at(10, 0), at(9, 0)).is_err());
}

#[test]
fn touching_intervals_do_not_overlap() {
    let a = iv(9, 0, 10, 0);
    let b = iv(10, 0, 11, 0);
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
}

#[test]
fn partial_and_nested_overlaps() {
    let outer = iv(9, 0, 12, 0);
    let inner = iv(10, 0, 10, 25);
    let straddle = iv(11, 30, 13, 0);
    assert!(outer.overlaps(&inner));
    assert!(inner.overlaps(&outer));
    assert!(outer.overlaps(&straddle));
    assert!(outer.covers(&inner));
    assert!(!outer.covers(&straddle));
}

#[test]
fn contains_instant_is_half_open() {
    let lesson = iv(10, 0, 10, 25);
    assert!(lesson.contains_instant(at(10, 0)));
    assert!(lesson.contains_instant(at(10, 24)));
    assert!(!lesson.contains_instant(at(10, 25)));
}

#[test]
fn clamp_trims_to_window_and_drops_outside() {
    let block = iv(8, 0, 10, 0);
    let clamped = block.clamp(at(9, 0), at(17, 0)).unwrap();
    assert_eq!(clamped, iv(9, 0, 10, 0));

    assert!(block.clamp(at(10, 0), at(17, 0)).is_none(), "touching window edge leaves nothing");
    assert!(block.clamp(at(12, 0), at(17, 0)).is_none());
}

#[test]
fn intersection_and_gap() {
    let a = iv(9, 0, 10, 0);
    let b = iv(9, 30, 11, 0);
    assert_eq!(a.intersection(&b), Some(iv(9, 30, 10, 0)));
    assert_eq!(a.gap_to(&iv(10, 15, 11, 0)), Duration::minutes(15));
    assert!(a.gap_to(&b) < Duration::zero());
    assert_eq!(a.intersection(&iv(10, 0, 11, 0)), None);
}

#[test]
fn duration_minutes_rounds_to_nearest() {
    let start = at(9, 0);
    let just_under = Interval::new(start, start + Duration::seconds(89 * 60 + 29)).unwrap();
    let half = Interval::new(start, start + Duration::seconds(89 * 60 + 30)).unwrap();
    assert_eq!(just_under.duration_minutes(), 89);
    assert_eq!(half.duration_minutes(), 90);
    assert_eq!(round_minutes(Duration::seconds(20)), 0);
    assert_eq!(round_minutes(Duration::seconds(40)), 1);
}

#[test]
fn deserializing_an_inverted_interval_fails() {
    let ok: Interval =
        serde_json::from_str(r#"{"start":"2026-03-16T09:00:00Z","end":"2026-03-16T10:00:00Z"}"#)
            .unwrap();
    assert_eq!(ok, iv(9, 0, 10, 0));

    let bad = serde_json::from_str::<Interval>(
        r#"{"start":"2026-03-16T10:00:00Z","end":"2026-03-16T09:00:00Z"}"#,
    );
    assert!(bad.is_err());
}
