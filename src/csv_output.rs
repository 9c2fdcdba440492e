//! CSV output format for hourly reports
//!
//! Fields are written unquoted. Phone numbers and datetimes as produced by the
//! report never contain commas; arbitrary text in these columns would not
//! survive a round trip.

use crate::report::ReportRow;
use chrono::NaiveDate;

/// Header row of the report file
pub const CSV_HEADER: &str = "DateTime,Phone Number,Calls in Hour";

/// File name of a report for the given date stamp
pub fn report_filename(date: NaiveDate) -> String {
    format!("missed_calls_{}.csv", date.format("%Y-%m-%d"))
}

/// CSV report formatter
#[derive(Debug, Default)]
pub struct ReportCsv {
    rows: Vec<ReportRow>,
}

impl ReportCsv {
    /// Create an empty CSV formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter holding `rows` in their current order
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        Self {
            rows: rows.to_vec(),
        }
    }

    /// Add a row to the output
    pub fn add_row(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    fn format_row(row: &ReportRow) -> String {
        [
            row.datetime.as_str(),
            row.phone_number.as_str(),
            &row.calls_in_hour.to_string(),
        ]
        .join(",")
    }

    /// Header plus one line per row, newline-separated
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(CSV_HEADER.to_string());
        lines.extend(self.rows.iter().map(Self::format_row));
        lines.join("\n")
    }
}
