//! Tests for free minutes and the partitioned timeline.

use booking_engine::freebusy::{first_free_slot, free_busy, EntryType, FreeBusy};
use booking_engine::interval::Interval;
use booking_engine::merger::merge;
use booking_engine::model::{BlockKind, EventKind, TaggedInterval, TimelineKind};
use chrono::{DateTime, Duration, TimeZone, Utc};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
    Interval::new(at(sh, sm), at(eh, em)).unwrap()
}

fn tagged(id: &str, kind: TimelineKind, sh: u32, sm: u32, eh: u32, em: u32) -> TaggedInterval {
    TaggedInterval::new(iv(sh, sm, eh, em), kind, id)
}

fn avail(id: &str, sh: u32, sm: u32, eh: u32, em: u32) -> TaggedInterval {
    tagged(id, TimelineKind::Block(BlockKind::Available), sh, sm, eh, em)
}

fn lesson(id: &str, sh: u32, sm: u32, eh: u32, em: u32) -> TaggedInterval {
    tagged(id, TimelineKind::Event(EventKind::Lesson), sh, sm, eh, em)
}

fn shape(fb: &FreeBusy) -> Vec<(EntryType, Interval)> {
    fb.timeline.iter().map(|e| (e.entry_type, e.interval)).collect()
}

fn assert_partition(fb: &FreeBusy, start: DateTime<Utc>, end: DateTime<Utc>) {
    assert_eq!(fb.timeline.first().unwrap().interval.start(), start);
    assert_eq!(fb.timeline.last().unwrap().interval.end(), end);
    for pair in fb.timeline.windows(2) {
        assert_eq!(pair[0].interval.end(), pair[1].interval.start(), "gap or overlap in timeline");
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn availability_under_a_booking() {
    // Availability 09:00-12:00, active lesson 10:00-10:25 → 180 - 25 = 155.
    let merged = merge(
        &[avail("a", 9, 0, 12, 0), lesson("l", 10, 0, 10, 25)],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(9, 0), at(12, 0));

    assert_eq!(fb.free_minutes, 155);
    assert_eq!(
        shape(&fb),
        vec![
            (EntryType::Free, iv(9, 0, 10, 0)),
            (EntryType::Event, iv(10, 0, 10, 25)),
            (EntryType::Free, iv(10, 25, 12, 0)),
        ]
    );
    let event = &fb.timeline[1];
    assert_eq!(event.source.as_ref().unwrap().ids, vec!["l"]);
}

#[test]
fn merged_gap_counts_as_free() {
    let merged = merge(
        &[avail("a", 9, 0, 10, 0), avail("b", 10, 15, 11, 0)],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(9, 0), at(11, 0));

    assert_eq!(fb.free_minutes, 120);
    assert_eq!(shape(&fb), vec![(EntryType::Free, iv(9, 0, 11, 0))]);
}

#[test]
fn no_availability_means_no_free_time() {
    let fb = free_busy(&[], at(8, 0), at(17, 0));

    assert_eq!(fb.free_minutes, 0);
    assert_eq!(shape(&fb), vec![(EntryType::Unavailable, iv(8, 0, 17, 0))]);
}

#[test]
fn undeclared_time_is_unavailable_not_free() {
    let fb = free_busy(&[avail("a", 9, 0, 12, 0)], at(8, 0), at(18, 0));

    assert_eq!(fb.free_minutes, 180);
    assert_eq!(
        shape(&fb),
        vec![
            (EntryType::Unavailable, iv(8, 0, 9, 0)),
            (EntryType::Free, iv(9, 0, 12, 0)),
            (EntryType::Unavailable, iv(12, 0, 18, 0)),
        ]
    );
    assert_partition(&fb, at(8, 0), at(18, 0));
}

#[test]
fn booking_outside_availability_does_not_reduce_free_time() {
    let merged = merge(
        &[avail("a", 9, 0, 12, 0), lesson("l", 14, 0, 14, 25)],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(8, 0), at(18, 0));

    assert_eq!(fb.free_minutes, 180);
    assert_eq!(fb.event_entries().count(), 1);
    assert_partition(&fb, at(8, 0), at(18, 0));
}

#[test]
fn overlapping_bookings_each_subtract_their_full_length() {
    let merged = merge(
        &[
            avail("a", 9, 0, 12, 0),
            lesson("l1", 10, 0, 10, 30),
            lesson("l2", 10, 15, 10, 45),
        ],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(9, 0), at(12, 0));

    // 180 - 30 - 30.
    assert_eq!(fb.free_minutes, 120);
    // The timeline itself shows 10:00-10:45 busy once.
    assert_eq!(fb.open_minutes(), 135);
    assert_partition(&fb, at(9, 0), at(12, 0));
}

#[test]
fn booking_running_past_availability_subtracts_its_whole_length() {
    // Availability 09:00-12:00, lesson 11:30-12:30 → 180 - 60.
    let merged = merge(
        &[avail("a", 9, 0, 12, 0), lesson("l", 11, 30, 12, 30)],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(8, 0), at(13, 0));

    assert_eq!(fb.free_minutes, 120);
    assert_eq!(fb.open_minutes(), 150);
    assert_eq!(
        shape(&fb),
        vec![
            (EntryType::Unavailable, iv(8, 0, 9, 0)),
            (EntryType::Free, iv(9, 0, 11, 30)),
            (EntryType::Event, iv(11, 30, 12, 30)),
            (EntryType::Unavailable, iv(12, 30, 13, 0)),
        ]
    );
}

#[test]
fn free_minutes_never_go_negative() {
    let merged = merge(
        &[
            avail("a", 9, 0, 10, 0),
            lesson("l1", 8, 0, 9, 30),
            lesson("l2", 9, 30, 11, 0),
        ],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(8, 0), at(11, 0));

    assert_eq!(fb.free_minutes, 0);
}

#[test]
fn time_off_hides_availability() {
    let merged = merge(
        &[
            avail("a", 9, 0, 12, 0),
            tagged("off", TimelineKind::Block(BlockKind::TimeOff), 11, 0, 12, 0),
        ],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(9, 0), at(12, 0));

    assert_eq!(fb.free_minutes, 120);
    assert_eq!(
        shape(&fb),
        vec![
            (EntryType::Free, iv(9, 0, 11, 0)),
            (EntryType::Event, iv(11, 0, 12, 0)),
        ]
    );
}

#[test]
fn booking_inside_time_off_splits_it_and_keeps_the_full_span() {
    let merged = merge(
        &[
            tagged("off", TimelineKind::Block(BlockKind::TimeOff), 9, 0, 12, 0),
            lesson("l", 10, 0, 11, 0),
        ],
        Duration::minutes(30),
    );

    let fb = free_busy(&merged, at(9, 0), at(12, 0));

    let ids: Vec<&str> = fb
        .timeline
        .iter()
        .map(|e| e.source.as_ref().unwrap().ids[0].as_str())
        .collect();
    assert_eq!(ids, vec!["off", "l", "off"]);
    assert_eq!(fb.timeline[0].source.as_ref().unwrap().span, iv(9, 0, 12, 0));
    assert_eq!(fb.free_minutes, 0);
}

#[test]
fn class_block_beats_time_off_when_co_located() {
    let merged = vec![
        tagged("class", TimelineKind::Block(BlockKind::Class), 10, 0, 11, 0),
        tagged("off", TimelineKind::Block(BlockKind::TimeOff), 10, 0, 11, 0),
    ];

    let fb = free_busy(&merged, at(10, 0), at(11, 0));

    assert_eq!(fb.timeline.len(), 1);
    assert_eq!(fb.timeline[0].source.as_ref().unwrap().ids, vec!["class"]);
}

#[test]
fn intervals_beyond_the_window_are_clamped() {
    let merged = vec![avail("a", 7, 0, 20, 0)];

    let fb = free_busy(&merged, at(9, 0), at(10, 0));

    assert_eq!(fb.free_minutes, 60);
    assert_eq!(shape(&fb), vec![(EntryType::Free, iv(9, 0, 10, 0))]);
}

#[test]
fn free_minutes_round_to_nearest() {
    let start = at(9, 0);
    let forty_seconds = Interval::new(start, start + Duration::seconds(40)).unwrap();
    let merged = vec![TaggedInterval::new(
        forty_seconds,
        TimelineKind::Block(BlockKind::Available),
        "a",
    )];

    let fb = free_busy(&merged, at(9, 0), at(10, 0));

    assert_eq!(fb.free_minutes, 1);
}

#[test]
fn inverted_window_is_empty() {
    let fb = free_busy(&[avail("a", 9, 0, 12, 0)], at(12, 0), at(9, 0));

    assert_eq!(fb.free_minutes, 0);
    assert!(fb.timeline.is_empty());
}

// ── First free slot ─────────────────────────────────────────────────────────

#[test]
fn first_free_slot_with_minimum_duration() {
    let merged = merge(
        &[
            avail("a", 9, 0, 12, 0),
            lesson("l1", 9, 20, 9, 45),
            lesson("l2", 10, 0, 10, 25),
        ],
        Duration::minutes(30),
    );
    let fb = free_busy(&merged, at(9, 0), at(12, 0));

    let slot = first_free_slot(&fb, 60).expect("a 60 minute slot exists");

    assert_eq!(slot.interval, iv(10, 25, 12, 0));
    assert!(first_free_slot(&fb, 120).is_none());
}
