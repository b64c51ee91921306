//! Compute free minutes and a partitioned day/week timeline.
//!
//! Walks a merged interval set with a cursor from `window_start` to
//! `window_end`, cutting at every interval boundary. Each piece becomes:
//!
//! - `event` when an occupier covers it (booked events beat class blocks,
//!   which beat time off),
//! - `free` when declared availability covers it and nothing occupies it,
//! - `unavailable` otherwise.
//!
//! Consecutive pieces with the same meaning are joined, so the result covers
//! the window exactly once.
//!
//! `free_minutes` is declared availability in the window minus the full
//! in-window length of every occupier that overlaps it, floored at zero.
//! Occupiers outside declared availability do not reduce free time. The
//! length of the `free` entries themselves is [`FreeBusy::open_minutes`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{round_minutes, Interval};
use crate::merger::union_of;
use crate::model::{TaggedInterval, TimelineKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Event,
    Free,
    /// Neither booked nor declared available.
    Unavailable,
}

/// What a timeline entry was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySource {
    pub kind: TimelineKind,
    /// Block or event ids.
    pub ids: Vec<String>,
    /// Full extent of the source inside the window. Wider than the entry when a
    /// higher-priority occupier splits it.
    pub span: Interval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub entry_type: EntryType,
    pub interval: Interval,
    pub source: Option<EntrySource>,
}

impl TimelineEntry {
    pub fn duration_minutes(&self) -> i64 {
        self.interval.duration_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusy {
    /// Available minutes less the occupiers overlapping them, rounded to
    /// nearest and never negative.
    pub free_minutes: i64,
    /// Partition of the window, ascending.
    pub timeline: Vec<TimelineEntry>,
}

impl FreeBusy {
    pub fn free_entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.timeline
            .iter()
            .filter(|e| e.entry_type == EntryType::Free)
    }

    /// Total length of the `free` entries, rounded to nearest. Differs from
    /// `free_minutes` when an occupier runs past the availability it overlaps
    /// or occupiers overlap each other.
    pub fn open_minutes(&self) -> i64 {
        round_minutes(
            self.free_entries()
                .fold(Duration::zero(), |total, e| total + e.interval.duration()),
        )
    }

    pub fn event_entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.timeline
            .iter()
            .filter(|e| e.entry_type == EntryType::Event)
    }
}

fn source_of(t: &TaggedInterval) -> EntrySource {
    EntrySource {
        kind: t.kind,
        ids: t.sources.clone(),
        span: t.interval,
    }
}

/// Pick the occupier shown for a piece: highest priority, then earliest start.
fn covering_occupier<'a>(occupiers: &[&'a TaggedInterval], piece: &Interval) -> Option<&'a TaggedInterval> {
    occupiers
        .iter()
        .copied()
        .filter(|t| t.interval.covers(piece))
        .min_by(|a, b| {
            b.kind
                .priority()
                .cmp(&a.kind.priority())
                .then_with(|| TaggedInterval::timeline_order(a, b))
        })
}

/// Append a piece, joining it onto the previous entry when they mean the same.
fn push_piece(timeline: &mut Vec<TimelineEntry>, piece: TimelineEntry) {
    if let Some(last) = timeline.last_mut() {
        if last.entry_type == piece.entry_type && last.interval.end() == piece.interval.start() {
            let joinable = match (&mut last.source, &piece.source) {
                (None, None) => true,
                (Some(a), Some(b)) if piece.entry_type == EntryType::Event => *a == *b,
                (Some(a), Some(b)) => {
                    // Free pieces from touching availability read as one slot.
                    for id in &b.ids {
                        if !a.ids.contains(id) {
                            a.ids.push(id.clone());
                        }
                    }
                    a.span = a.span.hull(&b.span);
                    true
                }
                _ => false,
            };
            if joinable {
                last.interval = last.interval.hull(&piece.interval);
                return;
            }
        }
    }
    timeline.push(piece);
}

/// `sum(available) - sum(occupiers overlapping available)`, floored at zero.
///
/// Both sides are already clamped to the window. Availability is unioned so
/// unmerged input is not counted twice.
fn free_time(available: &[&TaggedInterval], occupiers: &[&TaggedInterval]) -> Duration {
    let declared = union_of(available.iter().map(|t| &t.interval));
    let total = declared
        .iter()
        .fold(Duration::zero(), |sum, iv| sum + iv.duration());
    let booked = occupiers
        .iter()
        .filter(|o| declared.iter().any(|a| a.overlaps(&o.interval)))
        .fold(Duration::zero(), |sum, o| sum + o.interval.duration());
    (total - booked).max(Duration::zero())
}

/// Compute free minutes and the window's timeline from merged intervals.
///
/// An empty or inverted window yields zero minutes and no entries.
pub fn free_busy(
    merged: &[TaggedInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> FreeBusy {
    if window_start >= window_end {
        return FreeBusy {
            free_minutes: 0,
            timeline: Vec::new(),
        };
    }

    let clamped: Vec<TaggedInterval> = merged
        .iter()
        .filter_map(|t| {
            t.interval.clamp(window_start, window_end).map(|iv| TaggedInterval {
                interval: iv,
                kind: t.kind,
                sources: t.sources.clone(),
            })
        })
        .collect();
    let occupiers: Vec<&TaggedInterval> = clamped.iter().filter(|t| t.kind.is_occupier()).collect();
    let available: Vec<&TaggedInterval> = clamped.iter().filter(|t| t.kind.is_available()).collect();

    let mut cuts: Vec<DateTime<Utc>> = clamped
        .iter()
        .flat_map(|t| [t.interval.start(), t.interval.end()])
        .chain([window_start, window_end])
        .collect();
    cuts.sort();
    cuts.dedup();

    let free = free_time(&available, &occupiers);

    let mut timeline: Vec<TimelineEntry> = Vec::new();
    let mut cursor = window_start;

    for &cut in cuts.iter().skip(1) {
        // Cuts are strictly increasing, so every piece is non-empty.
        let Ok(piece) = Interval::new(cursor, cut) else {
            continue;
        };
        cursor = cut;

        let entry = if let Some(occupier) = covering_occupier(&occupiers, &piece) {
            TimelineEntry {
                entry_type: EntryType::Event,
                interval: piece,
                source: Some(source_of(occupier)),
            }
        } else if let Some(avail) = available.iter().find(|t| t.interval.covers(&piece)) {
            TimelineEntry {
                entry_type: EntryType::Free,
                interval: piece,
                source: Some(source_of(avail)),
            }
        } else {
            TimelineEntry {
                entry_type: EntryType::Unavailable,
                interval: piece,
                source: None,
            }
        };
        push_piece(&mut timeline, entry);
    }

    FreeBusy {
        free_minutes: round_minutes(free),
        timeline,
    }
}

/// The first free entry at least `min_minutes` long.
pub fn first_free_slot(free_busy: &FreeBusy, min_minutes: i64) -> Option<&TimelineEntry> {
    free_busy
        .free_entries()
        .find(|e| e.duration_minutes() >= min_minutes)
}

