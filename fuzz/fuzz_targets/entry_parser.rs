#![no_main]

use callsweep::entry::RawEntry;
use callsweep::parser::{canonical_phone, resolve_timestamp, EntryParser};
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary row text must never panic
    if let Ok(input) = std::str::from_utf8(data) {
        let Some(now) = NaiveDate::from_ymd_opt(2026, 10, 19).and_then(|d| d.and_hms_opt(12, 0, 0))
        else {
            return;
        };

        let (sender, timestamp) = input.split_once('\n').unwrap_or((input, input));
        let entry = RawEntry::new(0, sender, timestamp, format!("Missed call {input}"));
        let _ = EntryParser::default().parse(&entry, now);
        let _ = resolve_timestamp(input, now);
        let _ = canonical_phone(input);
    }
});
