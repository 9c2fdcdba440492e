//! Report sinks: where a finished report goes

use crate::collector::ReportSink;
use crate::csv_output::{report_filename, ReportCsv};
use crate::json_output::JsonReport;
use crate::report::ReportRow;
use chrono::NaiveDateTime;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes `missed_calls_<date>.csv` into a directory
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    output_dir: PathBuf,
    written: Option<PathBuf>,
}

impl CsvFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: None,
        }
    }

    /// Path of the last report written, if any
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl ReportSink for CsvFileSink {
    fn deliver(&mut self, rows: &[ReportRow], generated_at: NaiveDateTime) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(report_filename(generated_at.date()));
        fs::write(&path, ReportCsv::from_rows(rows).to_csv())?;
        self.written = Some(path);
        Ok(())
    }
}

/// Writes the report as a JSON document to any writer (stdout in the CLI)
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn deliver(&mut self, rows: &[ReportRow], generated_at: NaiveDateTime) -> io::Result<()> {
        let json = JsonReport::new(generated_at, rows).to_json()?;
        writeln!(self.writer, "{}", json)
    }
}
