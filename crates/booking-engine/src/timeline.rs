//! Read path: blocks and events in, rendered timeline out.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::freebusy::{free_busy, FreeBusy, TimelineEntry};
use crate::materializer::{materialize, project_events};
use crate::merger::merge;
use crate::model::{AvailabilityBlock, BookedEvent, TaggedInterval};
use crate::window::{day_window, week_window};

/// A rendered window: the free/busy partition plus the inactive events a
/// calendar may still draw crossed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub free_minutes: i64,
    pub entries: Vec<TimelineEntry>,
    pub inactive: Vec<TaggedInterval>,
}

impl Timeline {
    fn from_parts(
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        free_busy: FreeBusy,
        inactive: Vec<TaggedInterval>,
    ) -> Self {
        Self {
            window_start,
            window_end,
            free_minutes: free_busy.free_minutes,
            entries: free_busy.timeline,
            inactive,
        }
    }
}

/// Materialize, merge and partition `[window_start, window_end)`.
///
/// # Errors
/// Only when `config.timezone` is not a known IANA zone.
pub fn build_timeline(
    blocks: &[AvailabilityBlock],
    events: &[BookedEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Timeline> {
    let tz = config.tz()?;

    let mut intervals = materialize(blocks, window_start, window_end, tz);
    let projected = project_events(events, window_start, window_end);
    intervals.extend(projected.active);

    let merged = merge(&intervals, config.gap_tolerance());
    let fb = free_busy(&merged, window_start, window_end);
    debug!(
        entries = fb.timeline.len(),
        free_minutes = fb.free_minutes,
        "built timeline"
    );

    Ok(Timeline::from_parts(
        window_start,
        window_end,
        fb,
        projected.inactive,
    ))
}

/// Timeline of one local day in the configured timezone.
pub fn day_timeline(
    blocks: &[AvailabilityBlock],
    events: &[BookedEvent],
    date: NaiveDate,
    config: &EngineConfig,
) -> Result<Timeline> {
    let window = day_window(date, config.tz()?)?;
    build_timeline(blocks, events, window.start(), window.end(), config)
}

/// Timeline of the local week containing `date`.
pub fn week_timeline(
    blocks: &[AvailabilityBlock],
    events: &[BookedEvent],
    date: NaiveDate,
    config: &EngineConfig,
) -> Result<Timeline> {
    let window = week_window(date, config.week_start, config.tz()?)?;
    build_timeline(blocks, events, window.start(), window.end(), config)
}
