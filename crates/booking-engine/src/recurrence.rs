//! Weekly recurrence expansion.
//!
//! A weekly block ("Tuesdays 09:00-12:00, Europe/Berlin") is expanded with the
//! `rrule` crate into the local dates it falls on. Each date's start and end
//! are then resolved through the timezone separately, so every occurrence gets
//! the UTC offset in force at its own wall-clock times, and an occurrence that
//! lands on a DST transition never takes its neighbours down with it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::interval::Interval;
use crate::window::{local_day_start, resolve_local};

/// Where an occurrence ends on its local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEnd {
    At(NaiveTime),
    /// `"24:00"`: the start of the next local day.
    Midnight,
}

/// A validated weekly rule: weekday plus local start and end times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyRule {
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end: DayEnd,
}

/// Map `0 = Sunday … 6 = Saturday` to a weekday.
pub fn weekday_from_index(day_of_week: u8) -> Option<Weekday> {
    match day_of_week {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Parse `"HH:MM"` or `"HH:MM:SS"`.
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn is_end_of_day(s: &str) -> bool {
    matches!(s.trim(), "24:00" | "24:00:00")
}

impl WeeklyRule {
    /// Validate the stored fields of a weekly block.
    ///
    /// # Errors
    /// `EngineError::AmbiguousRecurrence` when the day is outside `0..=6`, a time
    /// does not parse, or the end is not after the start.
    pub fn parse(block_id: &str, day_of_week: u8, start_time: &str, end_time: &str) -> Result<Self> {
        let ambiguous = |reason: String| EngineError::AmbiguousRecurrence {
            block_id: block_id.to_string(),
            reason,
        };

        let weekday = weekday_from_index(day_of_week)
            .ok_or_else(|| ambiguous(format!("day_of_week {day_of_week} is outside 0..=6")))?;
        let start = parse_time_of_day(start_time)
            .ok_or_else(|| ambiguous(format!("unparseable start_time '{start_time}'")))?;

        let end = if is_end_of_day(end_time) {
            DayEnd::Midnight
        } else {
            let end = parse_time_of_day(end_time)
                .ok_or_else(|| ambiguous(format!("unparseable end_time '{end_time}'")))?;
            if end <= start {
                return Err(ambiguous(format!(
                    "end_time '{end_time}' is not after start_time '{start_time}'"
                )));
            }
            DayEnd::At(end)
        };

        Ok(Self {
            weekday,
            start_time: start,
            end,
        })
    }

    /// The occurrence on local `date`, or `None` when the timezone cannot
    /// place it.
    pub fn occurrence_on(&self, date: NaiveDate, tz: Tz) -> Option<Interval> {
        let start = resolve_local(date.and_time(self.start_time), tz)?;
        let end = match self.end {
            DayEnd::At(time) => resolve_local(date.and_time(time), tz)?,
            DayEnd::Midnight => local_day_start(date.succ_opt()?, tz).ok()?,
        };
        Interval::new(start, end).ok()
    }

    /// First date on or after `from` that falls on this rule's weekday.
    fn first_on_or_after(&self, from: NaiveDate) -> NaiveDate {
        let offset = (7 + self.weekday.num_days_from_sunday() - from.weekday().num_days_from_sunday()) % 7;
        from + Duration::days(offset as i64)
    }

    /// Concrete occurrences that intersect `[window_start, window_end)`.
    ///
    /// Occurrences are returned whole; clamping to the window is the caller's
    /// job. `block_id` only labels errors and logs.
    pub fn expand(
        &self,
        block_id: &str,
        tz: Tz,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Interval>> {
        if window_start >= window_end {
            return Ok(Vec::new());
        }

        // Start a day early so an occurrence beginning before the window but
        // running into it is still produced.
        let from = window_start.with_timezone(&tz).date_naive() - Duration::days(1);
        let last = window_end.with_timezone(&tz).date_naive();
        let first = self.first_on_or_after(from);
        if first > last {
            return Ok(Vec::new());
        }

        let weeks = (last - first).num_days() / 7 + 1;
        let count = u16::try_from(weeks).unwrap_or(u16::MAX);

        // Walk local dates in UTC, which has no transitions for rrule to
        // reject; wall-clock times are resolved per date below.
        let rule_text = format!(
            "DTSTART:{}T000000Z\nRRULE:FREQ=WEEKLY;COUNT={}",
            first.format("%Y%m%d"),
            count
        );

        let rule_set: RRuleSet = rule_text.parse().map_err(|e| EngineError::AmbiguousRecurrence {
            block_id: block_id.to_string(),
            reason: format!("rrule rejected weekly expansion: {e}"),
        })?;

        let occurrences = rule_set
            .all(count)
            .dates
            .into_iter()
            .filter_map(|dt| {
                let date = dt.with_timezone(&Utc).date_naive();
                let occurrence = self.occurrence_on(date, tz);
                if occurrence.is_none() {
                    debug!(block_id, %date, "weekly occurrence has no local time, skipped");
                }
                occurrence
            })
            .filter(|iv| iv.start() < window_end && iv.end() > window_start)
            .collect();

        Ok(occurrences)
    }
}
