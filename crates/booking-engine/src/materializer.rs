//! Project availability blocks and booked events onto a concrete window.
//!
//! Weekly and absolute blocks both come out as [`TaggedInterval`]s clamped to
//! `[window_start, window_end)`, sorted by start with co-located intervals
//! ordered `class > time_off > available`. A block that cannot be materialized
//! is skipped with a warning; one bad record never blanks a calendar.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::error::Result;
use crate::interval::Interval;
use crate::model::{AvailabilityBlock, BookedEvent, Recurrence, TaggedInterval, TimelineKind};
use crate::recurrence::WeeklyRule;

/// Concrete, clamped occurrences of a single block.
///
/// # Errors
/// `InvalidInterval` for an absolute block with `end <= start`;
/// `AmbiguousRecurrence` for a malformed weekly block.
pub fn materialize_block(
    block: &AvailabilityBlock,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    tz: Tz,
) -> Result<Vec<Interval>> {
    let occurrences = match &block.recurrence {
        Recurrence::Weekly {
            day_of_week,
            start_time,
            end_time,
        } => WeeklyRule::parse(&block.id, *day_of_week, start_time, end_time)?.expand(
            &block.id,
            tz,
            window_start,
            window_end,
        )?,
        Recurrence::Absolute { start, end } => vec![Interval::new(*start, *end)?],
    };

    Ok(occurrences
        .iter()
        .filter_map(|iv| iv.clamp(window_start, window_end))
        .collect())
}

/// Materialize every block into tagged intervals inside the window.
///
/// Deterministic for the same inputs; an empty or inverted window yields
/// nothing.
pub fn materialize(
    blocks: &[AvailabilityBlock],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    tz: Tz,
) -> Vec<TaggedInterval> {
    if window_start >= window_end {
        return Vec::new();
    }

    let mut tagged: Vec<TaggedInterval> = Vec::new();
    for block in blocks {
        match materialize_block(block, window_start, window_end, tz) {
            Ok(intervals) => tagged.extend(
                intervals
                    .into_iter()
                    .map(|iv| TaggedInterval::new(iv, TimelineKind::Block(block.kind), &block.id)),
            ),
            Err(e) => warn!(block_id = %block.id, error = %e, "skipping availability block"),
        }
    }

    tagged.sort_by(TaggedInterval::timeline_order);
    debug!(blocks = blocks.len(), intervals = tagged.len(), "materialized availability");
    tagged
}

/// Booked events inside a window, split by whether they still hold time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedEvents {
    /// `scheduled` / `in_progress` events; these occupy time.
    pub active: Vec<TaggedInterval>,
    /// `completed` / `cancelled` events, kept for display only.
    pub inactive: Vec<TaggedInterval>,
}

/// Tag and clamp booked events to the window.
pub fn project_events(
    events: &[BookedEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> ProjectedEvents {
    let mut projected = ProjectedEvents::default();
    if window_start >= window_end {
        return projected;
    }

    for event in events {
        let interval = match event.interval() {
            Ok(iv) => iv,
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "skipping booked event");
                continue;
            }
        };
        let Some(clamped) = interval.clamp(window_start, window_end) else {
            continue;
        };
        let tagged = TaggedInterval::new(clamped, TimelineKind::Event(event.kind), &event.id);
        if event.is_active() {
            projected.active.push(tagged);
        } else {
            projected.inactive.push(tagged);
        }
    }

    projected.active.sort_by(TaggedInterval::timeline_order);
    projected.inactive.sort_by(TaggedInterval::timeline_order);
    projected
}
