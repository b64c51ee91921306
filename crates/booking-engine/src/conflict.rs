//! Booking-time conflict detection.
//!
//! Results are values, not errors: the booking flow picks its copy from the
//! variant. A `None` result is advisory and reserves nothing; the write path
//! still needs its own atomic overlap check.
//!
//! Overlap is half-open, so a lesson ending at 10:00 never conflicts with one
//! starting at 10:00.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::interval::Interval;
use crate::model::{AcceptedClass, BookedEvent, EventKind};

/// Which input set produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSource {
    BookedEvent,
    AcceptedClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConflictResult {
    None,
    /// The proposal overlaps an active event or an accepted class.
    Conflict {
        event_id: String,
        kind: EventKind,
        interval: Interval,
        source: ConflictSource,
    },
    /// The proposal starts within the minimum lead time.
    TooSoon {
        must_start_after: DateTime<Utc>,
        lead_time_minutes: i64,
    },
    /// The tutor is in, or about to start, an active event.
    CurrentlyBusy {
        event_id: String,
        kind: EventKind,
        interval: Interval,
    },
}

impl ConflictResult {
    pub fn is_none(&self) -> bool {
        matches!(self, ConflictResult::None)
    }
}

/// Active events whose interval overlaps `proposed`, earliest first.
///
/// Completed and cancelled events never conflict. Events with an invalid
/// interval are skipped with a warning.
pub fn conflicting_events<'a>(proposed: &Interval, events: &'a [BookedEvent]) -> Vec<(&'a BookedEvent, Interval)> {
    let mut hits: Vec<(&BookedEvent, Interval)> = events
        .iter()
        .filter(|e| e.is_active())
        .filter_map(|e| match e.interval() {
            Ok(iv) => Some((e, iv)),
            Err(err) => {
                warn!(event_id = %e.id, error = %err, "ignoring event with invalid interval");
                None
            }
        })
        .filter(|(_, iv)| iv.overlaps(proposed))
        .collect();
    hits.sort_by(|(a, a_iv), (b, b_iv)| (a_iv.start(), &a.id).cmp(&(b_iv.start(), &b.id)));
    hits
}

/// Report the first conflict for `proposed`.
///
/// Booked events are checked before accepted classes, so a lesson conflict is
/// reported even when a class overlaps too.
pub fn check_conflict(
    proposed: &Interval,
    events: &[BookedEvent],
    accepted_classes: &[AcceptedClass],
) -> ConflictResult {
    if let Some((event, interval)) = conflicting_events(proposed, events).into_iter().next() {
        return ConflictResult::Conflict {
            event_id: event.id.clone(),
            kind: event.kind,
            interval,
            source: ConflictSource::BookedEvent,
        };
    }

    let first_class = accepted_classes
        .iter()
        .filter_map(|c| match c.interval() {
            Ok(iv) => Some((c, iv)),
            Err(err) => {
                warn!(class_id = %c.class_id, error = %err, "ignoring class with invalid interval");
                None
            }
        })
        .filter(|(_, iv)| iv.overlaps(proposed))
        .min_by(|(a, a_iv), (b, b_iv)| (a_iv.start(), &a.class_id).cmp(&(b_iv.start(), &b.class_id)));

    match first_class {
        Some((class, interval)) => ConflictResult::Conflict {
            event_id: class.class_id.clone(),
            kind: EventKind::Class,
            interval,
            source: ConflictSource::AcceptedClass,
        },
        None => ConflictResult::None,
    }
}

/// Full booking check: lead time first, then conflicts.
///
/// `proposed` must start strictly more than `config.lead_time()` after `now`.
pub fn check_booking(
    proposed: &Interval,
    now: DateTime<Utc>,
    events: &[BookedEvent],
    accepted_classes: &[AcceptedClass],
    config: &EngineConfig,
) -> ConflictResult {
    let must_start_after = now + config.lead_time();
    if proposed.start() <= must_start_after {
        return ConflictResult::TooSoon {
            must_start_after,
            lead_time_minutes: config.lead_time_minutes,
        };
    }
    check_conflict(proposed, events, accepted_classes)
}

/// Whether a tutor may switch on instant availability (office hours) at `now`.
///
/// Busy when `now` falls inside an active event or one starts within
/// `[now, now + instant_buffer)`.
pub fn check_instant_availability(
    now: DateTime<Utc>,
    events: &[BookedEvent],
    config: &EngineConfig,
) -> ConflictResult {
    let lookahead = Interval::starting_at(now, config.instant_buffer()).ok();

    let blocking = events
        .iter()
        .filter(|e| e.is_active())
        .filter_map(|e| e.interval().ok().map(|iv| (e, iv)))
        .filter(|(_, iv)| iv.contains_instant(now) || lookahead.is_some_and(|p| p.overlaps(iv)))
        .min_by(|(a, a_iv), (b, b_iv)| (a_iv.start(), &a.id).cmp(&(b_iv.start(), &b.id)));

    match blocking {
        Some((event, interval)) => ConflictResult::CurrentlyBusy {
            event_id: event.id.clone(),
            kind: event.kind,
            interval,
        },
        None => ConflictResult::None,
    }
}
