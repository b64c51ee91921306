//! Error types for booking-engine operations.
//!
//! Conflicts, lead-time violations and busy tutors are *not* errors: they are
//! ordinary [`ConflictResult`](crate::conflict::ConflictResult) values.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::EventStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// `end <= start`.
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A weekly block with a malformed day of week or time of day.
    #[error("Ambiguous recurrence in block '{block_id}': {reason}")]
    AmbiguousRecurrence { block_id: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    /// An upstream input set could not be obtained. Callers fail open on this.
    #[error("Dependency unavailable: {part}: {reason}")]
    DependencyUnavailable { part: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
