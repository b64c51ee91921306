//! # booking-engine
//!
//! Availability and booking timeline engine for tutor calendars.
//!
//! Tutors declare weekly availability plus one-off time off and classes.
//! Students book lessons into it. This crate turns those declarations and
//! bookings into concrete, bookable time, and answers "can this be booked?"
//! at confirmation time. Every function is pure: callers pass the snapshots,
//! the window and "now" explicitly.
//!
//! ## Modules
//!
//! - [`interval`]: half-open `[start, end)` ranges
//! - [`model`]: availability blocks, booked events, tagged intervals
//! - [`recurrence`]: weekly block → concrete occurrences (via `rrule`)
//! - [`materializer`]: blocks and events → clamped, ordered intervals
//! - [`merger`]: join nearby availability without crossing bookings
//! - [`freebusy`]: free minutes and a partitioned timeline
//! - [`timeline`]: the whole read path for a window, day or week
//! - [`conflict`]: conflict, lead-time and office-hours checks
//! - [`snapshot`]: fail-open join of the upstream inputs
//! - [`window`]: local day and week windows
//! - [`config`]: tuning knobs
//! - [`error`]: error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod interval;
pub mod materializer;
pub mod merger;
pub mod model;
pub mod recurrence;
pub mod snapshot;
pub mod timeline;
pub mod window;

pub use config::EngineConfig;
pub use conflict::{check_booking, check_conflict, check_instant_availability, ConflictResult};
pub use error::EngineError;
pub use freebusy::{free_busy, FreeBusy, TimelineEntry};
pub use interval::Interval;
pub use materializer::{materialize, project_events};
pub use merger::merge;
pub use model::{
    AcceptedClass, AvailabilityBlock, BlockKind, BookedEvent, EventKind, EventStatus, Recurrence,
    TaggedInterval, TimelineKind,
};
pub use snapshot::{DegradedPart, Snapshot};
pub use timeline::{build_timeline, day_timeline, week_timeline, Timeline};
