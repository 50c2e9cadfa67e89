//!
//! src/cleaner.rs
//!
//! Turns raw song records into validated rows: date coercion,
//! critical field filtering, numeric coercion, de-duplication on
//! track_id and ISO date formatting, in that order
//!

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use tracing::info;

use crate::types::{
    CleanedRecord, RawRecord, TrackId, CRITICAL_FIELDS, ENERGY, RELEASE_DATE,
    TEMPO, TRACK_ID, TRACK_POPULARITY,
};

/// Full-date layouts tried in order
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d", "%m/%d/%Y",
    "%b %d, %Y", "%B %d, %Y", "%d %B %Y",
];

/// Date-time layouts, time of day is dropped
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M",
];

/// Row counts gathered during one cleaning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub input_rows: usize,
    pub dropped_critical: usize,
    pub dropped_duplicates: usize,
    pub output_rows: usize,
}

///
/// Parses a release date. Accepts full dates, date-times (with or
/// without an offset) and the partial `YYYY-MM` / `YYYY` forms, which
/// resolve to the first day of the period. Non-string values are invalid.
///
pub fn parse_release_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    parse_partial_date(raw)
}

fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    match raw.split_once('-') {
        Some((year, month)) if year.len() == 4 && all_digits(year) && all_digits(month) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        None if raw.len() == 4 && all_digits(raw) => {
            NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1)
        }
        _ => None,
    }
}

///
/// Coerces a value to a JSON number. Numbers pass through, strings are
/// trimmed and parsed (integers before floats), booleans become 1/0.
/// Anything else, including non-finite floats, yields None.
///
pub fn coerce_numeric(value: Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n),
        Value::String(s) => parse_number(s.trim()),
        Value::Bool(b) => Some(Number::from(u8::from(b))),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Cleans `records`, see `clean_with_stats`
pub fn clean(records: Vec<RawRecord>) -> Vec<CleanedRecord> {
    clean_with_stats(records).0
}

///
/// Single pass over `records` in input order. A row is dropped when its
/// track_id is missing/null or its release date does not parse, or when
/// an earlier surviving row already used the same track_id. Numeric
/// fields that fail coercion become null and never drop the row.
///
pub fn clean_with_stats(records: Vec<RawRecord>) -> (Vec<CleanedRecord>, CleanStats) {
    let mut stats = CleanStats { input_rows: records.len(), ..CleanStats::default() };
    info!(rows = stats.input_rows, "clean.input");

    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut cleaned = Vec::with_capacity(records.len());

    for raw in records {
        let mut fields = raw.into_fields();

        let release_date = fields.remove(RELEASE_DATE)
            .as_ref()
            .and_then(parse_release_date);
        let track_id = fields.remove(TRACK_ID).and_then(TrackId::new);

        let (Some(track_id), Some(release_date)) = (track_id, release_date) else {
            stats.dropped_critical += 1;
            continue;
        };

        let energy = fields.remove(ENERGY).map(coerce_numeric);
        let tempo = fields.remove(TEMPO).map(coerce_numeric);
        let track_popularity = fields.remove(TRACK_POPULARITY).map(coerce_numeric);

        if !seen.insert(track_id.key()) {
            stats.dropped_duplicates += 1;
            continue;
        }

        cleaned.push(CleanedRecord {
            track_id,
            track_album_release_date: release_date,
            energy,
            tempo,
            track_popularity,
            extra: fields,
        });
    }

    stats.output_rows = cleaned.len();
    info!(
        dropped = stats.dropped_critical,
        columns = ?CRITICAL_FIELDS,
        "clean.dropped_critical"
    );
    info!(
        duplicates = stats.dropped_duplicates,
        rows = stats.output_rows,
        "clean.output"
    );

    (cleaned, stats)
}
