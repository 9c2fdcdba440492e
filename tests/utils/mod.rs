// Shared helpers for integration tests
#![allow(dead_code)]

use callsweep::entry::{Identity, RawEntry};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Reference time used by the capture fixture
pub const FIXTURE_NOW: &str = "2026-10-19T16:30:00";

pub fn fixture_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(16, 30, 0)
        .unwrap()
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn capture_path() -> PathBuf {
    fixture_path("call_list_capture.json")
}

pub fn missed(identity: Identity, sender: &str, timestamp: &str) -> RawEntry {
    RawEntry::new(
        identity,
        sender,
        timestamp,
        format!("{sender} Missed call {timestamp}"),
    )
}

/// Expected CSV for the capture fixture at [`FIXTURE_NOW`]
pub const FIXTURE_CSV: &str = "DateTime,Phone Number,Calls in Hour\n\
10/19/2026 3:40 pm,(555)123-4567,2\n\
10/19/2026 1:10 pm,(555)222-3333,1\n\
10/18/2026 9:05 am,(555)222-3333,1\n\
10/18/2026 11:59 pm,(555)444-5555,1";
