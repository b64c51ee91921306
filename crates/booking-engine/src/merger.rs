//! Merge availability into displayable runs without crossing bookings.
//!
//! Only `available` intervals are merged. Booked events, time off and class
//! blocks are occupiers: they pass through unchanged, availability they fully
//! cover is dropped, and a gap they sit in is never bridged.

use chrono::Duration;
use tracing::debug;

use crate::interval::Interval;
use crate::model::TaggedInterval;

/// Collapse intervals into a sorted, disjoint cover (touching ones join).
pub(crate) fn union_of<'a>(intervals: impl IntoIterator<Item = &'a Interval>) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.into_iter().copied().collect();
    sorted.sort_by_key(|iv| (iv.start(), iv.end()));

    let mut merged: Vec<Interval> = Vec::new();
    for iv in sorted {
        if let Some(last) = merged.last_mut() {
            if iv.start() <= last.end() {
                *last = last.hull(&iv);
                continue;
            }
        }
        merged.push(iv);
    }
    merged
}

/// Whether `target` lies entirely inside a sorted, disjoint cover.
fn covered_by(cover: &[Interval], target: &Interval) -> bool {
    cover.iter().any(|c| c.covers(target))
}

/// Merge `available` intervals separated by at most `gap_tolerance`.
///
/// - Occupiers (booked events, time off, class blocks) are passed through.
/// - An `available` interval wholly under occupiers is discarded, not trimmed.
/// - Run `A` absorbs `B` when `B.start - A.end <= gap_tolerance` and no occupier
///   overlaps the gap between them.
///
/// The output is sorted like the materializer's, and `merge(merge(x)) == merge(x)`.
pub fn merge(intervals: &[TaggedInterval], gap_tolerance: Duration) -> Vec<TaggedInterval> {
    let (mut available, occupiers): (Vec<TaggedInterval>, Vec<TaggedInterval>) = intervals
        .iter()
        .cloned()
        .partition(|t| t.kind.is_available());

    let occupied = union_of(occupiers.iter().map(|t| &t.interval));

    let before = available.len();
    available.retain(|t| !covered_by(&occupied, &t.interval));
    if available.len() < before {
        debug!(
            dropped = before - available.len(),
            "discarded availability under occupiers"
        );
    }
    available.sort_by(|a, b| {
        (a.interval.start(), a.interval.end(), &a.sources).cmp(&(
            b.interval.start(),
            b.interval.end(),
            &b.sources,
        ))
    });

    let mut runs: Vec<TaggedInterval> = Vec::new();
    for next in available {
        if let Some(run) = runs.last_mut() {
            let gap = run.interval.gap_to(&next.interval);
            let bridgeable = gap <= gap_tolerance
                && match Interval::new(run.interval.end(), next.interval.start()) {
                    // Positive gap: it must be clear of every occupier.
                    Ok(between) => !occupied.iter().any(|o| o.overlaps(&between)),
                    // Touching or overlapping.
                    Err(_) => true,
                };
            if bridgeable {
                run.interval = run.interval.hull(&next.interval);
                for source in next.sources {
                    if !run.sources.contains(&source) {
                        run.sources.push(source);
                    }
                }
                continue;
            }
        }
        runs.push(next);
    }

    let mut out = occupiers;
    out.extend(runs);
    out.sort_by(TaggedInterval::timeline_order);
    out
}
