//! Raw entries as observed on the host list
//!
//! An entry is whatever the host surface renders for one logical call-log row.
//! Only its identity is stable; sender and timestamp text may be absent when the
//! host has not finished rendering the row.

use serde::{Deserialize, Serialize};

/// Stable position assigned by the host list to a logical entry
pub type Identity = u32;

/// Default content marker that flags a row as a missed call
pub const DEFAULT_MISSED_CALL_SIGNAL: &str = "Missed call";

/// One observed row of the call list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Stable identity (list position), independent of content
    pub identity: Identity,
    /// Free-text sender element (contains the phone number)
    #[serde(default)]
    pub sender: Option<String>,
    /// Free-text timestamp element ("2:15 PM", "Yesterday 9:05 AM", "3/1/2024")
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Full text content of the row
    #[serde(default)]
    pub content: String,
}

impl RawEntry {
    /// Create a fully rendered entry
    pub fn new(
        identity: Identity,
        sender: impl Into<String>,
        timestamp: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            sender: Some(sender.into()),
            timestamp: Some(timestamp.into()),
            content: content.into(),
        }
    }

    /// Whether the row content carries the missed-call marker
    pub fn signals_missed_call(&self, signal: &str) -> bool {
        self.content.contains(signal)
    }
}
