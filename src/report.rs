//! Hourly aggregation of accepted call records
//!
//! Records are bucketed by `(phone number, hour floor)`. Each bucket shows the
//! time of its most recent call and the number of calls in that clock hour.
//! Reports are always rebuilt from the full record set, so calling
//! [`build_report`] repeatedly is safe.

use crate::parser::CallRecord;
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Display format for report timestamps, e.g. `10/19/2026 2:50 pm`
pub const DISPLAY_DATETIME_FORMAT: &str = "%-m/%-d/%Y %-I:%M %P";

/// Final ordering of report rows
///
/// `Lexicographic` compares the rendered datetime strings, which is what
/// existing consumers of the report expect. It is not chronological across
/// month or day boundaries ("9/30/2026" sorts above "10/1/2026").
/// `Chronological` orders by the underlying timestamp instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOrdering {
    #[default]
    Lexicographic,
    Chronological,
}

/// One row of the hourly report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Rendered representative time (see [`DISPLAY_DATETIME_FORMAT`])
    pub datetime: String,
    /// Representative (most recent) call time in the bucket, not hour-floored
    pub display_timestamp: NaiveDateTime,
    pub phone_number: String,
    pub calls_in_hour: u32,
}

/// Zero the minutes, seconds and sub-seconds of a timestamp
pub fn hour_floor(timestamp: NaiveDateTime) -> NaiveDateTime {
    let hour = NaiveTime::from_hms_opt(timestamp.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
    timestamp.date().and_time(hour)
}

/// Render a timestamp as month/day/year with a 12-hour clock
pub fn format_display_datetime(timestamp: NaiveDateTime) -> String {
    timestamp.format(DISPLAY_DATETIME_FORMAT).to_string()
}

/// Fold accepted records into hourly rows
pub fn build_report(records: &[CallRecord], ordering: ReportOrdering) -> Vec<ReportRow> {
    // Most recent first, so the first record to reach a bucket is its representative
    let mut sorted: Vec<&CallRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut slots: FnvHashMap<(&str, NaiveDateTime), usize> = FnvHashMap::default();
    let mut buckets: Vec<(&CallRecord, u32)> = Vec::new();

    for record in sorted {
        let key = (record.phone_number.as_str(), hour_floor(record.timestamp));
        match slots.get(&key) {
            Some(&slot) => buckets[slot].1 += 1,
            None => {
                slots.insert(key, buckets.len());
                buckets.push((record, 1));
            }
        }
    }

    let mut rows: Vec<ReportRow> = buckets
        .into_iter()
        .map(|(representative, calls_in_hour)| ReportRow {
            datetime: format_display_datetime(representative.timestamp),
            display_timestamp: representative.timestamp,
            phone_number: representative.phone_number.clone(),
            calls_in_hour,
        })
        .collect();

    match ordering {
        ReportOrdering::Lexicographic => rows.sort_by(|a, b| b.datetime.cmp(&a.datetime)),
        ReportOrdering::Chronological => {
            rows.sort_by(|a, b| b.display_timestamp.cmp(&a.display_timestamp))
        }
    }

    rows
}

/// Total calls across all rows
pub fn total_calls(rows: &[ReportRow]) -> u64 {
    rows.iter().map(|row| u64::from(row.calls_in_hour)).sum()
}
