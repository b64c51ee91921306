//! Property-based tests for the interval algebra using proptest.
//!
//! These hold for *any* mix of availability, occupiers and windows, not just
//! the hand-picked cases in the other test files.

use std::collections::HashMap;

use booking_engine::conflict::check_conflict;
use booking_engine::freebusy::free_busy;
use booking_engine::interval::Interval;
use booking_engine::merger::merge;
use booking_engine::model::{BlockKind, BookedEvent, EventKind, EventStatus, TaggedInterval, TimelineKind};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

fn minutes(m: i64) -> DateTime<Utc> {
    base() + Duration::minutes(m)
}

/// An interval somewhere in a 16-hour day, 1 minute to 3 hours long.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (0i64..960, 1i64..=180).prop_map(|(start, len)| Interval::new(minutes(start), minutes(start + len)).unwrap())
}

fn arb_kind() -> impl Strategy<Value = TimelineKind> {
    prop_oneof![
        4 => Just(TimelineKind::Block(BlockKind::Available)),
        1 => Just(TimelineKind::Block(BlockKind::TimeOff)),
        1 => Just(TimelineKind::Block(BlockKind::Class)),
        2 => Just(TimelineKind::Event(EventKind::Lesson)),
        1 => Just(TimelineKind::Event(EventKind::Class)),
        1 => Just(TimelineKind::Event(EventKind::OfficeHours)),
    ]
}

/// Tagged intervals with unique ids `t0`, `t1`, ….
fn arb_tagged_set() -> impl Strategy<Value = Vec<TaggedInterval>> {
    prop::collection::vec((arb_interval(), arb_kind()), 0..16).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (iv, kind))| TaggedInterval::new(iv, kind, format!("t{i}")))
            .collect()
    })
}

fn arb_window() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    (0i64..600, 1i64..=600).prop_map(|(start, len)| (minutes(start), minutes(start + len)))
}

fn arb_tolerance() -> impl Strategy<Value = Duration> {
    (0i64..=60).prop_map(Duration::minutes)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Half-open overlap law, symmetric, touching never overlaps
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_law(a in arb_interval(), b in arb_interval()) {
        let expected = a.start() < b.end() && a.end() > b.start();
        prop_assert_eq!(a.overlaps(&b), expected);
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));

        let touching = Interval::new(a.end(), a.end() + Duration::minutes(5)).unwrap();
        prop_assert!(!a.overlaps(&touching));
    }
}

// ---------------------------------------------------------------------------
// Property 2: merge(merge(x)) == merge(x)
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_is_idempotent(set in arb_tagged_set(), tol in arb_tolerance()) {
        let once = merge(&set, tol);
        let twice = merge(&once, tol);
        prop_assert_eq!(once, twice);
    }
}

// ---------------------------------------------------------------------------
// Property 3: merged intervals never mix kinds; occupiers come out untouched
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_never_crosses_kinds(set in arb_tagged_set(), tol in arb_tolerance()) {
        let by_id: HashMap<&str, &TaggedInterval> =
            set.iter().map(|t| (t.primary_source(), t)).collect();

        for out in merge(&set, tol) {
            for id in &out.sources {
                let source = by_id[id.as_str()];
                prop_assert_eq!(source.kind, out.kind, "source {} changed kind", id);
            }
            if out.kind.is_occupier() {
                prop_assert_eq!(out.sources.len(), 1);
                prop_assert_eq!(&out, by_id[out.primary_source()]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: 0 <= free_minutes <= window minutes
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn free_minutes_are_bounded(
        set in arb_tagged_set(),
        tol in arb_tolerance(),
        (ws, we) in arb_window(),
    ) {
        let fb = free_busy(&merge(&set, tol), ws, we);
        let window_minutes = (we - ws).num_minutes();
        prop_assert!(fb.free_minutes >= 0);
        prop_assert!(fb.free_minutes <= window_minutes);
    }
}

// ---------------------------------------------------------------------------
// Property 5: the timeline partitions the window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn timeline_partitions_window(
        set in arb_tagged_set(),
        tol in arb_tolerance(),
        (ws, we) in arb_window(),
    ) {
        let fb = free_busy(&merge(&set, tol), ws, we);

        prop_assert!(!fb.timeline.is_empty());
        prop_assert_eq!(fb.timeline[0].interval.start(), ws);
        prop_assert_eq!(fb.timeline[fb.timeline.len() - 1].interval.end(), we);
        for pair in fb.timeline.windows(2) {
            prop_assert_eq!(pair[0].interval.end(), pair[1].interval.start());
        }

        let free_seconds: i64 = fb.free_entries().map(|e| e.interval.duration().num_seconds()).sum();
        prop_assert_eq!(fb.open_minutes(), (free_seconds + 30).div_euclid(60));
        prop_assert!(fb.free_minutes <= fb.open_minutes());
    }
}

// ---------------------------------------------------------------------------
// Property 6: conflict detection is symmetric
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn conflict_is_symmetric(p in arb_interval(), e in arb_interval()) {
        let as_events = |iv: Interval| {
            vec![BookedEvent::new("x", EventKind::Lesson, iv.start(), iv.end(), EventStatus::Scheduled)]
        };

        let p_vs_e = !check_conflict(&p, &as_events(e), &[]).is_none();
        let e_vs_p = !check_conflict(&e, &as_events(p), &[]).is_none();
        prop_assert_eq!(p_vs_e, e_vs_p);
        prop_assert_eq!(p_vs_e, p.overlaps(&e));
    }
}

// ---------------------------------------------------------------------------
// Property 7: inactive events never conflict
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn inactive_events_never_conflict(
        p in arb_interval(),
        e in arb_interval(),
        completed in any::<bool>(),
    ) {
        let status = if completed { EventStatus::Completed } else { EventStatus::Cancelled };
        let events = vec![BookedEvent::new("x", EventKind::Lesson, e.start(), e.end(), status)];
        prop_assert!(check_conflict(&p, &events, &[]).is_none());
    }
}
