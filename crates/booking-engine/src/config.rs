//! Engine tuning knobs.
//!
//! Defaults match the product: availability within 30 minutes shows as one
//! slot, lessons need 5 minutes of lead time, and instant availability is
//! refused when anything starts in the next 5 minutes.

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::window::WeekStartDay;

pub const DEFAULT_GAP_TOLERANCE_MINUTES: i64 = 30;
pub const DEFAULT_LEAD_TIME_MINUTES: i64 = 5;
pub const DEFAULT_INSTANT_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum spacing between availability intervals that still merge.
    pub gap_tolerance_minutes: i64,
    /// A lesson must start strictly more than this after "now".
    pub lead_time_minutes: i64,
    /// Look-ahead used before enabling office hours.
    pub instant_buffer_minutes: i64,
    /// IANA timezone that weekly blocks are declared in.
    pub timezone: String,
    pub week_start: WeekStartDay,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gap_tolerance_minutes: DEFAULT_GAP_TOLERANCE_MINUTES,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
            instant_buffer_minutes: DEFAULT_INSTANT_BUFFER_MINUTES,
            timezone: "UTC".to_string(),
            week_start: WeekStartDay::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative durations and unknown timezones.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("gap_tolerance_minutes", self.gap_tolerance_minutes),
            ("lead_time_minutes", self.lead_time_minutes),
            ("instant_buffer_minutes", self.instant_buffer_minutes),
        ] {
            if value < 0 {
                return Err(EngineError::Config(format!("{name} must be >= 0, got {value}")));
            }
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| EngineError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn gap_tolerance(&self) -> Duration {
        Duration::minutes(self.gap_tolerance_minutes)
    }

    pub fn lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }

    pub fn instant_buffer(&self) -> Duration {
        Duration::minutes(self.instant_buffer_minutes)
    }
}
