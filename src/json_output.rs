//! JSON output format for hourly reports (--format json)

use crate::report::{total_calls, ReportRow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Complete JSON report document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Instant the final observation pass resolved timestamps against
    pub generated_at: NaiveDateTime,
    /// Sum of `calls_in_hour` over all rows
    pub total_calls: u64,
    pub rows: Vec<ReportRow>,
}

impl JsonReport {
    pub fn new(generated_at: NaiveDateTime, rows: &[ReportRow]) -> Self {
        Self {
            generated_at,
            total_calls: total_calls(rows),
            rows: rows.to_vec(),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
