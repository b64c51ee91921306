//! Availability blocks, booked events, and the tagged intervals that flow
//! between the materializer, merger and free/busy stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::Interval;

// ── Availability store ──────────────────────────────────────────────────────

/// What a declared block means for bookability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Available,
    TimeOff,
    Class,
}

/// How a block repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every week on `day_of_week` (0 = Sunday … 6 = Saturday), between two
    /// local times of day (`"HH:MM"` or `"HH:MM:SS"`; `"24:00"` allowed as an
    /// end). Times are kept as stored and validated when materialized.
    Weekly {
        day_of_week: u8,
        start_time: String,
        end_time: String,
    },
    /// A single concrete range. Used for time off and scheduled classes.
    Absolute {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A tutor-declared block of availability, time off, or class time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub id: String,
    pub kind: BlockKind,
    pub recurrence: Recurrence,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl AvailabilityBlock {
    pub fn weekly(
        id: impl Into<String>,
        kind: BlockKind,
        day_of_week: u8,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            recurrence: Recurrence::Weekly {
                day_of_week,
                start_time: start_time.into(),
                end_time: end_time.into(),
            },
            label: None,
            color: None,
        }
    }

    pub fn absolute(
        id: impl Into<String>,
        kind: BlockKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            recurrence: Recurrence::Absolute { start, end },
            label: None,
            color: None,
        }
    }
}

// ── Booked event store ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Lesson,
    Class,
    OfficeHours,
}

/// Lifecycle of a booked event.
///
/// ```text
/// scheduled ──> in_progress ──> completed
///     │              │
///     └──> cancelled <┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Active events occupy time and take part in conflict checks.
    pub fn is_active(self) -> bool {
        matches!(self, EventStatus::Scheduled | EventStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

/// A lesson, class or office-hours session on a participant's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedEvent {
    pub id: String,
    pub kind: EventKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: EventStatus,
    #[serde(default)]
    pub participant_ids: Vec<String>,
}

impl BookedEvent {
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: EventStatus,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            start,
            end,
            status,
            participant_ids: Vec::new(),
        }
    }

    pub fn interval(&self) -> Result<Interval> {
        Interval::new(self.start, self.end)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: EventStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// A class the user accepted an invitation to and that is not cancelled.
///
/// The class-membership collaborator does that filtering before handing these
/// to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedClass {
    pub class_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AcceptedClass {
    pub fn new(class_id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            class_id: class_id.into(),
            start,
            end,
        }
    }

    pub fn interval(&self) -> Result<Interval> {
        Interval::new(self.start, self.end)
    }
}

// ── Tagged intervals ────────────────────────────────────────────────────────

/// Where a concrete interval came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "kind", rename_all = "snake_case")]
pub enum TimelineKind {
    Block(BlockKind),
    Event(EventKind),
}

impl TimelineKind {
    /// Precedence when intervals are co-located: booked events, then class
    /// blocks, then time off, then plain availability.
    pub fn priority(self) -> u8 {
        match self {
            TimelineKind::Event(_) => 3,
            TimelineKind::Block(BlockKind::Class) => 2,
            TimelineKind::Block(BlockKind::TimeOff) => 1,
            TimelineKind::Block(BlockKind::Available) => 0,
        }
    }

    pub fn is_available(self) -> bool {
        self == TimelineKind::Block(BlockKind::Available)
    }

    /// Occupiers hold time on the calendar: booked events, time off, classes.
    pub fn is_occupier(self) -> bool {
        !self.is_available()
    }

    pub fn is_booked(self) -> bool {
        matches!(self, TimelineKind::Event(_))
    }
}

/// A concrete interval tagged with its kind and the ids it was built from.
///
/// Materialized blocks and projected events carry exactly one source id;
/// merged availability runs carry the ids of every block they absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedInterval {
    pub interval: Interval,
    pub kind: TimelineKind,
    pub sources: Vec<String>,
}

impl TaggedInterval {
    pub fn new(interval: Interval, kind: TimelineKind, source: impl Into<String>) -> Self {
        Self {
            interval,
            kind,
            sources: vec![source.into()],
        }
    }

    /// The first source id; the block or event this interval stands for.
    pub fn primary_source(&self) -> &str {
        self.sources.first().map(String::as_str).unwrap_or_default()
    }

    /// Ascending start, then higher priority first, then end, then id.
    pub(crate) fn timeline_order(a: &TaggedInterval, b: &TaggedInterval) -> std::cmp::Ordering {
        a.interval
            .start()
            .cmp(&b.interval.start())
            .then_with(|| b.kind.priority().cmp(&a.kind.priority()))
            .then_with(|| a.interval.end().cmp(&b.interval.end()))
            .then_with(|| a.sources.cmp(&b.sources))
    }
}
