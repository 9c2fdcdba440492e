//! Entry parser: raw call-list rows into call records
//!
//! Recency is decided from the shape of the timestamp text, not from elapsed
//! time. The host renders calls from today as a bare clock time ("2:15 PM") and
//! calls from yesterday as "Yesterday 9:05 AM"; anything older carries a
//! calendar date and falls outside the window.
//!
//! Supported shapes:
//! - Time only: `H:MM`, optional `AM`/`PM` (any case), resolved against today
//! - Relative day: `Yesterday H:MM`, optional `AM`/`PM`, resolved against yesterday
//!
//! Without a period suffix the hour is taken literally ("9:05" is 09:05,
//! "21:05" is 21:05).

use crate::entry::{Identity, RawEntry, DEFAULT_MISSED_CALL_SIGNAL};
use crate::error::EntryError;
use chrono::{NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const TIME_ONLY_PATTERN: &str = r"^([0-9]{1,2}):([0-9]{2})\s*(?i:(AM|PM))?$";
const RELATIVE_DAY_PATTERN: &str = r"^Yesterday\s+([0-9]{1,2}):([0-9]{2})\s*(?i:(AM|PM))?$";
const PHONE_PATTERN: &str =
    r"(?:\+?1[\s.\-]*)?\(?\s*([0-9]{3})\s*\)?[\s.\-]*([0-9]{3})[\s.\-]*([0-9]{4})";

const RELATIVE_DAY_PREFIX: &str = "Yesterday";

fn time_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIME_ONLY_PATTERN).expect("time-only pattern compiles"))
}

fn relative_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RELATIVE_DAY_PATTERN).expect("relative-day pattern compiles"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"))
}

/// A missed call resolved to an absolute wall-clock time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub timestamp: NaiveDateTime,
    /// Canonical `(AAA)EEE-LLLL`
    pub phone_number: String,
    pub source_identity: Identity,
}

/// Result of parsing one raw entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Accepted(CallRecord),
    RejectedNotMissedCall,
    RejectedOutOfWindow,
    RejectedUnparseable(EntryError),
}

impl ParseOutcome {
    /// The accepted record, if any
    pub fn record(&self) -> Option<&CallRecord> {
        match self {
            Self::Accepted(record) => Some(record),
            _ => None,
        }
    }
}

/// Parses raw entries into call records
///
/// Pure: the result depends only on the entry, the injected `now` and the
/// configured missed-call signal.
#[derive(Debug, Clone)]
pub struct EntryParser {
    missed_call_signal: String,
}

impl Default for EntryParser {
    fn default() -> Self {
        Self::new(DEFAULT_MISSED_CALL_SIGNAL)
    }
}

impl EntryParser {
    /// Create a parser that recognizes missed calls by `signal` in the row content
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            missed_call_signal: signal.into(),
        }
    }

    /// Parse one raw entry observed at `now`
    pub fn parse(&self, raw: &RawEntry, now: NaiveDateTime) -> ParseOutcome {
        if !raw.signals_missed_call(&self.missed_call_signal) {
            return ParseOutcome::RejectedNotMissedCall;
        }

        let Some(sender) = raw.sender.as_deref() else {
            return ParseOutcome::RejectedUnparseable(EntryError::MissingRequiredField("sender"));
        };
        let Some(timestamp_text) = raw.timestamp.as_deref() else {
            return ParseOutcome::RejectedUnparseable(EntryError::MissingRequiredField(
                "timestamp",
            ));
        };
        let timestamp_text = timestamp_text.trim();

        if !is_within_time_range(timestamp_text) {
            return ParseOutcome::RejectedOutOfWindow;
        }

        let Some(timestamp) = resolve_timestamp(timestamp_text, now) else {
            return ParseOutcome::RejectedUnparseable(EntryError::UnparseableTimestamp(
                timestamp_text.to_string(),
            ));
        };

        let Some(phone_number) = canonical_phone(sender) else {
            return ParseOutcome::RejectedUnparseable(EntryError::UnparseablePhoneNumber(
                sender.to_string(),
            ));
        };

        ParseOutcome::Accepted(CallRecord {
            timestamp,
            phone_number,
            source_identity: raw.identity,
        })
    }
}

/// Textual recency check: a bare clock time or anything starting with "Yesterday"
pub fn is_within_time_range(text: &str) -> bool {
    let text = text.trim();
    time_only_re().is_match(text) || text.starts_with(RELATIVE_DAY_PREFIX)
}

/// Resolve a recent-shaped timestamp text against `now`
///
/// Returns `None` when the text matches neither shape or names an impossible
/// clock time.
pub fn resolve_timestamp(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = text.trim();
    let today = now.date();

    if let Some(caps) = time_only_re().captures(text) {
        return clock_time(&caps).map(|time| today.and_time(time));
    }

    if let Some(caps) = relative_day_re().captures(text) {
        let yesterday = today.pred_opt()?;
        return clock_time(&caps).map(|time| yesterday.and_time(time));
    }

    None
}

/// Convert captured `(hour, minute, period)` into a clock time
fn clock_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;

    match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(period) if period == "PM" && hour != 12 => hour += 12,
        Some(period) if period == "AM" && hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Extract a NANP-shaped number from free text and canonicalize it
///
/// Accepts an optional leading `+1`/`1` and the usual separators
/// (spaces, dots, dashes, parentheses).
pub fn canonical_phone(text: &str) -> Option<String> {
    let caps = phone_re().captures(text)?;
    Some(format!("({}){}-{}", &caps[1], &caps[2], &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn missed(identity: Identity, sender: &str, timestamp: &str) -> RawEntry {
        RawEntry::new(identity, sender, timestamp, format!("Missed call {timestamp}"))
    }

    #[test]
    fn test_today_time_only_pm() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(4, "+1 (555) 123-4567", "2:15 PM"), now());

        assert_eq!(
            outcome,
            ParseOutcome::Accepted(CallRecord {
                timestamp: at(2026, 10, 19, 14, 15),
                phone_number: "(555)123-4567".to_string(),
                source_identity: 4,
            })
        );
    }

    #[test]
    fn test_yesterday_am() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(0, "555.987.6543", "Yesterday 9:05 AM"), now());
        let record = outcome.record().unwrap();
        assert_eq!(record.timestamp, at(2026, 10, 18, 9, 5));
        assert_eq!(record.phone_number, "(555)987-6543");
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        let first_of_month = at(2026, 11, 1, 8, 0);
        let resolved = resolve_timestamp("Yesterday 11:59 PM", first_of_month).unwrap();
        assert_eq!(resolved, at(2026, 10, 31, 23, 59));
    }

    #[test]
    fn test_absolute_date_out_of_window() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(1, "5551234567", "3/1/2024 10:00 AM"), now());
        assert_eq!(outcome, ParseOutcome::RejectedOutOfWindow);
    }

    #[test]
    fn test_not_missed_call() {
        let parser = EntryParser::default();
        let entry = RawEntry::new(2, "5551234567", "2:15 PM", "Outgoing call");
        assert_eq!(
            parser.parse(&entry, now()),
            ParseOutcome::RejectedNotMissedCall
        );
    }

    #[test]
    fn test_missing_fields() {
        let parser = EntryParser::default();
        let mut entry = missed(3, "5551234567", "2:15 PM");
        entry.timestamp = None;
        assert_eq!(
            parser.parse(&entry, now()),
            ParseOutcome::RejectedUnparseable(EntryError::MissingRequiredField("timestamp"))
        );

        entry.sender = None;
        assert_eq!(
            parser.parse(&entry, now()),
            ParseOutcome::RejectedUnparseable(EntryError::MissingRequiredField("sender"))
        );
    }

    #[test]
    fn test_yesterday_with_garbage_is_unparseable() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(5, "5551234567", "Yesterday at noon"), now());
        assert!(matches!(
            outcome,
            ParseOutcome::RejectedUnparseable(EntryError::UnparseableTimestamp(_))
        ));
    }

    #[test]
    fn test_impossible_clock_time_is_unparseable() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(6, "5551234567", "13:30 PM"), now());
        assert!(matches!(
            outcome,
            ParseOutcome::RejectedUnparseable(EntryError::UnparseableTimestamp(_))
        ));
    }

    #[test]
    fn test_unparseable_phone() {
        let parser = EntryParser::default();
        let outcome = parser.parse(&missed(7, "Unknown caller", "2:15 PM"), now());
        assert_eq!(
            outcome,
            ParseOutcome::RejectedUnparseable(EntryError::UnparseablePhoneNumber(
                "Unknown caller".to_string()
            ))
        );
    }

    #[test]
    fn test_twelve_hour_conversion() {
        assert_eq!(
            resolve_timestamp("12:10 AM", now()),
            Some(at(2026, 10, 19, 0, 10))
        );
        assert_eq!(
            resolve_timestamp("12:10 pm", now()),
            Some(at(2026, 10, 19, 12, 10))
        );
        assert_eq!(
            resolve_timestamp("1:00pm", now()),
            Some(at(2026, 10, 19, 13, 0))
        );
    }

    #[test]
    fn test_no_period_leaves_hour_unconverted() {
        assert_eq!(resolve_timestamp("9:05", now()), Some(at(2026, 10, 19, 9, 5)));
        assert_eq!(
            resolve_timestamp("21:05", now()),
            Some(at(2026, 10, 19, 21, 5))
        );
    }

    #[test]
    fn test_window_is_textual() {
        assert!(is_within_time_range("2:15 PM"));
        assert!(is_within_time_range("  10:00  "));
        assert!(is_within_time_range("Yesterday 9:05 AM"));
        assert!(is_within_time_range("Yesterday"));
        assert!(!is_within_time_range("3/1/2024 10:00 AM"));
        assert!(!is_within_time_range("Mon 2:15 PM"));
        assert!(!is_within_time_range("2 days ago"));
        assert!(!is_within_time_range("yesterday 9:05 AM"));
    }

    #[test]
    fn test_canonical_phone_shapes() {
        for text in [
            "+1 (555) 123-4567",
            "+15551234567",
            "1-555-123-4567",
            "(555)123-4567",
            "555 123 4567",
            "555.123.4567",
            "Call from +1 555-123-4567 (mobile)",
        ] {
            assert_eq!(
                canonical_phone(text).as_deref(),
                Some("(555)123-4567"),
                "{text}"
            );
        }
    }

    #[test]
    fn test_canonical_phone_leading_one_in_area_code() {
        assert_eq!(
            canonical_phone("123-456-7890").as_deref(),
            Some("(123)456-7890")
        );
        assert_eq!(
            canonical_phone("1234567890").as_deref(),
            Some("(123)456-7890")
        );
    }

    #[test]
    fn test_canonical_phone_rejects_short_numbers() {
        assert_eq!(canonical_phone("555-1234"), None);
        assert_eq!(canonical_phone(""), None);
    }

    #[test]
    fn test_custom_signal() {
        let parser = EntryParser::new("Appel manqué");
        let entry = RawEntry::new(0, "5551234567", "2:15 PM", "Appel manqué");
        assert!(parser.parse(&entry, now()).record().is_some());
    }
}
