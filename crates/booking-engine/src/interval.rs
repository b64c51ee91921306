//! Half-open time intervals.
//!
//! Every downstream stage (merge, free/busy, conflict) works on [`Interval`]
//! values only; recurrence rules never leave the materializer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open time range `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for Interval {
    type Error = EngineError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Build an interval, rejecting zero and negative durations.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval of `duration` beginning at `start`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self> {
        Self::new(start, start + duration)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration in whole minutes, rounded to nearest.
    pub fn duration_minutes(&self) -> i64 {
        round_minutes(self.duration())
    }

    /// Two intervals overlap iff `a.start < b.end && a.end > b.start`.
    ///
    /// Touching intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whether `instant` lies in `[start, end)`.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlapping part of two intervals, if any.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        Interval::new(self.start.max(other.start), self.end.min(other.end)).ok()
    }

    /// Smallest interval containing both.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Clip to `[window_start, window_end)`. `None` when nothing remains.
    pub fn clamp(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Option<Interval> {
        Interval::new(self.start.max(window_start), self.end.min(window_end)).ok()
    }

    /// Signed distance from the end of `self` to the start of `next`.
    /// Negative when they overlap.
    pub fn gap_to(&self, next: &Interval) -> Duration {
        next.start - self.end
    }
}

/// Round a duration to the nearest whole minute (half rounds up).
pub fn round_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() + 30).div_euclid(60)
}
