//! WASM bindings for booking-engine.
//!
//! Exposes the timeline read path, the booking check and the office-hours
//! check to JavaScript via `wasm-bindgen`. All complex types cross the
//! boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/booking-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::model::{AcceptedClass, AvailabilityBlock, BookedEvent};
use booking_engine::{EngineConfig, Interval};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: parse boundary inputs
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 with an offset (e.g. "2026-03-16T14:00:00+00:00") and
/// naive datetimes (e.g. "2026-03-16T14:00:00"), which are read as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

/// `None` or an empty string means the default config.
fn parse_config(json: Option<&str>) -> Result<EngineConfig, String> {
    match json {
        Some(s) if !s.trim().is_empty() => EngineConfig::from_json(s).map_err(|e| e.to_string()),
        _ => Ok(EngineConfig::default()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Native implementations, wrapped below
// ---------------------------------------------------------------------------

fn timeline_json(
    blocks_json: &str,
    events_json: &str,
    window_start: &str,
    window_end: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let blocks: Vec<AvailabilityBlock> = parse_json("availability", blocks_json)?;
    let events: Vec<BookedEvent> = parse_json("events", events_json)?;
    let ws = parse_datetime(window_start)?;
    let we = parse_datetime(window_end)?;
    let config = parse_config(config_json)?;

    let timeline = booking_engine::build_timeline(&blocks, &events, ws, we, &config)
        .map_err(|e| e.to_string())?;
    to_json(&timeline)
}

fn week_timeline_json(
    blocks_json: &str,
    events_json: &str,
    date: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let blocks: Vec<AvailabilityBlock> = parse_json("availability", blocks_json)?;
    let events: Vec<BookedEvent> = parse_json("events", events_json)?;
    let date = parse_date(date)?;
    let config = parse_config(config_json)?;

    let timeline = booking_engine::week_timeline(&blocks, &events, date, &config)
        .map_err(|e| e.to_string())?;
    to_json(&timeline)
}

fn check_booking_json(
    proposed_start: &str,
    proposed_end: &str,
    now: &str,
    events_json: &str,
    classes_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let proposed = Interval::new(parse_datetime(proposed_start)?, parse_datetime(proposed_end)?)
        .map_err(|e| e.to_string())?;
    let now = parse_datetime(now)?;
    let events: Vec<BookedEvent> = parse_json("events", events_json)?;
    let classes: Vec<AcceptedClass> = parse_json("accepted classes", classes_json)?;
    let config = parse_config(config_json)?;

    to_json(&booking_engine::check_booking(&proposed, now, &events, &classes, &config))
}

fn instant_availability_json(
    now: &str,
    events_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let now = parse_datetime(now)?;
    let events: Vec<BookedEvent> = parse_json("events", events_json)?;
    let config = parse_config(config_json)?;

    to_json(&booking_engine::check_instant_availability(now, &events, &config))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Build the free/busy timeline for `[window_start, window_end)`.
///
/// # Arguments
/// - `blocks_json` -- JSON array of availability blocks
/// - `events_json` -- JSON array of booked events (any status)
/// - `window_start`, `window_end` -- ISO 8601 datetimes
/// - `config_json` -- Optional engine config; omitted fields take defaults
#[wasm_bindgen(js_name = "buildTimeline")]
pub fn build_timeline(
    blocks_json: &str,
    events_json: &str,
    window_start: &str,
    window_end: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    timeline_json(blocks_json, events_json, window_start, window_end, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Build the timeline of the local week containing `date` ("YYYY-MM-DD").
#[wasm_bindgen(js_name = "weekTimeline")]
pub fn week_timeline(
    blocks_json: &str,
    events_json: &str,
    date: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    week_timeline_json(blocks_json, events_json, date, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Check a proposed lesson against lead time, booked events and accepted
/// classes. Returns a JSON object tagged by `result`.
#[wasm_bindgen(js_name = "checkBooking")]
pub fn check_booking(
    proposed_start: &str,
    proposed_end: &str,
    now: &str,
    events_json: &str,
    classes_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    check_booking_json(
        proposed_start,
        proposed_end,
        now,
        events_json,
        classes_json,
        config_json.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Whether office hours may be switched on at `now`.
#[wasm_bindgen(js_name = "checkInstantAvailability")]
pub fn check_instant_availability(
    now: &str,
    events_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    instant_availability_json(now, events_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}
