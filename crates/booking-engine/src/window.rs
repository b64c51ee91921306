//! Local day and week windows.
//!
//! Calendar views ask for "Tuesday" or "the week of March 16" in the tutor's
//! timezone. These helpers turn that into the UTC window every other stage
//! takes, so DST-shortened or lengthened days come out 23 or 25 hours long.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::Interval;

/// Which day begins a week view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStartDay {
    /// ISO 8601 weeks.
    #[default]
    Monday,
    /// US/Canada convention.
    Sunday,
}

fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

/// Resolve a wall-clock time in `tz` to a UTC instant.
///
/// A time repeated by a fall-back transition takes its first occurrence. A
/// time skipped by a spring-forward gap shifts forward by the length of the
/// gap (02:30 on a New York spring day becomes 03:30 EDT).
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Some(first.with_timezone(&Utc)),
        LocalResult::None => {
            // Read the time with the offset in force before the gap.
            let before = (1..=48)
                .map(|hours| naive - Duration::hours(hours))
                .find_map(|earlier| tz.from_local_datetime(&earlier).earliest())?;
            before
                .offset()
                .fix()
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// The first instant of `date` in `tz`.
///
/// A few zones skip local midnight on DST days; the day then starts where the
/// gap ends.
pub fn local_day_start(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| resolve_local(midnight, tz))
        .ok_or_else(|| EngineError::InvalidTimezone(format!("{}: no start of day on {date}", tz.name())))
}

/// `[local midnight, next local midnight)` for `date`.
pub fn day_window(date: NaiveDate, tz: Tz) -> Result<Interval> {
    let start = local_day_start(date, tz)?;
    let end = local_day_start(date + Duration::days(1), tz)?;
    Interval::new(start, end)
}

/// The seven-day window containing `date`, beginning on `week_start`.
pub fn week_window(date: NaiveDate, week_start: WeekStartDay, tz: Tz) -> Result<Interval> {
    let first = date - Duration::days(days_from_week_start(date.weekday(), week_start));
    let start = local_day_start(first, tz)?;
    let end = local_day_start(first + Duration::days(7), tz)?;
    Interval::new(start, end)
}
