//! `booking` CLI: render timelines and check bookings against a calendar
//! snapshot from the command line.
//!
//! A snapshot is a JSON object with up to three sections:
//!
//! ```json
//! {"availability": [...], "events": [...], "accepted_classes": [...]}
//! ```
//!
//! A section that is missing or malformed is treated as unavailable: the
//! command continues with an empty set, warns on stderr, and lists the section
//! under `degraded` in its output.
//!
//! ## Usage
//!
//! ```sh
//! # Free/busy timeline for an explicit window
//! booking timeline -i snapshot.json --start 2026-03-16T09:00:00Z --end 2026-03-16T12:00:00Z
//!
//! # One local day or week in the tutor's timezone
//! booking day -i snapshot.json --date 2026-03-16 --timezone America/New_York
//! booking week -i snapshot.json --date 2026-03-18
//!
//! # Can this 25-minute lesson be booked now?
//! cat snapshot.json | booking check --start 2026-03-16T14:00:00Z --minutes 25
//!
//! # May office hours be switched on?
//! booking office-hours -i snapshot.json --now 2026-03-16T09:57:00Z
//! ```
//!
//! Set `BOOKING_LOG` (e.g. `BOOKING_LOG=booking_engine=debug`) or pass `-v`
//! for more logging.

use anyhow::{bail, Context, Result};
use booking_engine::model::{AcceptedClass, AvailabilityBlock, BookedEvent};
use booking_engine::{EngineConfig, Interval, Snapshot};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "booking",
    version,
    about = "Tutor availability timelines and booking checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (JSON); omitted fields take their defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// IANA timezone for weekly blocks and day/week windows
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Snapshot file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Free/busy timeline for [start, end)
    Timeline {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long, value_parser = parse_datetime)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_datetime)]
        end: DateTime<Utc>,
    },
    /// Timeline of one local day
    Day {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Local date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Timeline of the local week containing a date
    Week {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Any local date in the week (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Check a proposed lesson for lead time and conflicts
    Check {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long, value_parser = parse_datetime)]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_datetime, conflicts_with = "minutes")]
        end: Option<DateTime<Utc>>,
        /// Lesson length, as an alternative to --end
        #[arg(long)]
        minutes: Option<i64>,
        /// Evaluate as of this instant instead of the current time
        #[arg(long, value_parser = parse_datetime)]
        now: Option<DateTime<Utc>>,
    },
    /// Check whether office hours may be switched on
    OfficeHours {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Evaluate as of this instant instead of the current time
        #[arg(long, value_parser = parse_datetime)]
        now: Option<DateTime<Utc>>,
    },
}

/// A command result plus the snapshot sections it had to do without.
#[derive(Serialize)]
struct Report<T: Serialize> {
    #[serde(flatten)]
    body: T,
    degraded: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.timezone.as_deref())?;
    debug!(?config, "loaded engine config");

    let output = match cli.command {
        Commands::Timeline {
            snapshot,
            start,
            end,
        } => {
            if end <= start {
                bail!("--end must be after --start");
            }
            let snap = load_snapshot(snapshot.input.as_deref())?;
            let timeline = snap
                .timeline(start, end, &config)
                .context("Failed to build timeline")?;
            render(&snap, timeline, cli.pretty)?
        }
        Commands::Day { snapshot, date } => {
            let snap = load_snapshot(snapshot.input.as_deref())?;
            let timeline = booking_engine::day_timeline(&snap.availability, &snap.events, date, &config)
                .context("Failed to build day timeline")?;
            render(&snap, timeline, cli.pretty)?
        }
        Commands::Week { snapshot, date } => {
            let snap = load_snapshot(snapshot.input.as_deref())?;
            let timeline = booking_engine::week_timeline(&snap.availability, &snap.events, date, &config)
                .context("Failed to build week timeline")?;
            render(&snap, timeline, cli.pretty)?
        }
        Commands::Check {
            snapshot,
            start,
            end,
            minutes,
            now,
        } => {
            let proposed = proposed_interval(start, end, minutes)?;
            let snap = load_snapshot(snapshot.input.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            let result = snap.check_booking(&proposed, now, &config);
            info!(?result, "checked booking");
            render(&snap, result, cli.pretty)?
        }
        Commands::OfficeHours { snapshot, now } => {
            let snap = load_snapshot(snapshot.input.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            let result = snap.check_instant_availability(now, &config);
            info!(?result, "checked instant availability");
            render(&snap, result, cli.pretty)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// Log to stderr so stdout stays pure JSON. `BOOKING_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("BOOKING_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .try_init();
}

/// Parse an ISO 8601 datetime. Naive datetimes are read as UTC.
fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            EngineConfig::from_json(&json).with_context(|| format!("Invalid config file: {}", path))?
        }
        None => EngineConfig::default(),
    };
    if let Some(tz) = timezone {
        config.timezone = tz.to_string();
        config.validate().context("Invalid --timezone")?;
    }
    Ok(config)
}

fn proposed_interval(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    minutes: Option<i64>,
) -> Result<Interval> {
    let end = match (end, minutes) {
        (Some(end), _) => end,
        (None, Some(minutes)) => start + Duration::minutes(minutes),
        (None, None) => bail!("either --end or --minutes is required"),
    };
    Interval::new(start, end).context("Invalid proposed lesson")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Pull one section out of the snapshot document.
fn section<T: DeserializeOwned>(doc: &Map<String, Value>, key: &str) -> std::result::Result<Vec<T>, String> {
    match doc.get(key) {
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| format!("malformed section: {}", e)),
        None => Err("section missing".to_string()),
    }
}

fn load_snapshot(path: Option<&str>) -> Result<Snapshot> {
    let raw = read_input(path)?;
    let doc: Value = serde_json::from_str(&raw).context("Failed to parse snapshot JSON")?;
    let Value::Object(doc) = doc else {
        bail!("Snapshot must be a JSON object");
    };

    Ok(Snapshot::resolve(
        section::<AvailabilityBlock>(&doc, "availability"),
        section::<BookedEvent>(&doc, "events"),
        section::<AcceptedClass>(&doc, "accepted_classes"),
    ))
}

fn render<T: Serialize>(snap: &Snapshot, body: T, pretty: bool) -> Result<String> {
    let report = Report {
        body,
        degraded: snap.degraded.iter().map(ToString::to_string).collect(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
