//! Join the three upstream inputs into one consistent snapshot.
//!
//! The read path needs availability and booked events; the booking path also
//! needs accepted classes. Callers fetch all three for one request and hand
//! the outcomes to [`Snapshot::resolve`]. A failed fetch fails open: it becomes
//! an empty set, is logged, and is listed in [`Snapshot::degraded`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::conflict::{check_booking, check_instant_availability, ConflictResult};
use crate::error::{EngineError, Result};
use crate::interval::Interval;
use crate::model::{AcceptedClass, AvailabilityBlock, BookedEvent};
use crate::timeline::{build_timeline, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPart {
    Availability,
    Events,
    AcceptedClasses,
}

impl fmt::Display for SnapshotPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotPart::Availability => "availability",
            SnapshotPart::Events => "events",
            SnapshotPart::AcceptedClasses => "accepted_classes",
        };
        f.write_str(name)
    }
}

/// An input that could not be fetched, with the error it failed with.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedPart {
    pub part: SnapshotPart,
    /// Always an `EngineError::DependencyUnavailable`.
    pub error: EngineError,
}

impl fmt::Display for DegradedPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Availability, bookings and accepted classes read for a single request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub availability: Vec<AvailabilityBlock>,
    pub events: Vec<BookedEvent>,
    pub accepted_classes: Vec<AcceptedClass>,
    /// Inputs that could not be fetched and were replaced by empty sets.
    pub degraded: Vec<DegradedPart>,
}

fn fail_open<T, E: fmt::Display>(
    part: SnapshotPart,
    fetched: std::result::Result<Vec<T>, E>,
    degraded: &mut Vec<DegradedPart>,
) -> Vec<T> {
    match fetched {
        Ok(items) => items,
        Err(e) => {
            warn!(part = %part, error = %e, "dependency unavailable, continuing with an empty set");
            degraded.push(DegradedPart {
                part,
                error: EngineError::DependencyUnavailable {
                    part: part.to_string(),
                    reason: e.to_string(),
                },
            });
            Vec::new()
        }
    }
}

impl Snapshot {
    pub fn new(
        availability: Vec<AvailabilityBlock>,
        events: Vec<BookedEvent>,
        accepted_classes: Vec<AcceptedClass>,
    ) -> Self {
        Self {
            availability,
            events,
            accepted_classes,
            degraded: Vec::new(),
        }
    }

    /// Wait on all three fetches, failing open on any that errored.
    pub fn resolve<E1, E2, E3>(
        availability: std::result::Result<Vec<AvailabilityBlock>, E1>,
        events: std::result::Result<Vec<BookedEvent>, E2>,
        accepted_classes: std::result::Result<Vec<AcceptedClass>, E3>,
    ) -> Self
    where
        E1: fmt::Display,
        E2: fmt::Display,
        E3: fmt::Display,
    {
        let mut degraded = Vec::new();
        let availability = fail_open(SnapshotPart::Availability, availability, &mut degraded);
        let events = fail_open(SnapshotPart::Events, events, &mut degraded);
        let accepted_classes =
            fail_open(SnapshotPart::AcceptedClasses, accepted_classes, &mut degraded);
        Self {
            availability,
            events,
            accepted_classes,
            degraded,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }

    pub fn is_degraded(&self, part: SnapshotPart) -> bool {
        self.degraded.iter().any(|d| d.part == part)
    }

    pub fn timeline(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Result<Timeline> {
        build_timeline(&self.availability, &self.events, window_start, window_end, config)
    }

    pub fn check_booking(
        &self,
        proposed: &Interval,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> ConflictResult {
        check_booking(proposed, now, &self.events, &self.accepted_classes, config)
    }

    pub fn check_instant_availability(&self, now: DateTime<Utc>, config: &EngineConfig) -> ConflictResult {
        check_instant_availability(now, &self.events, config)
    }
}
