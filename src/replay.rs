//! Captured host surfaces
//!
//! A capture records what a virtualized call list rendered at successive
//! scroll offsets. Replaying it drives the collector exactly as the live list
//! would, which makes runs reproducible offline.
//!
//! ```json
//! {
//!   "frames": [
//!     { "scroll_top": 0,   "entries": [ { "identity": 0, "sender": "...", "timestamp": "2:15 PM", "content": "Missed call" } ] },
//!     { "scroll_top": 480, "entries": [ ... ] }
//!   ]
//! }
//! ```

use crate::collector::{EntrySource, HostSurface};
use crate::entry::RawEntry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One rendered window at a given scroll offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFrame {
    pub scroll_top: u64,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// Ordered frames of a captured call list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub frames: Vec<CaptureFrame>,
}

impl Capture {
    /// Load a capture from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture {}", path.display()))?;

        Self::from_json_str(&content)
            .with_context(|| format!("Invalid capture {}", path.display()))
    }

    /// Parse a capture from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse capture JSON")
    }
}

/// Host surface that replays a capture frame by frame
///
/// Each reveal request advances one frame; past the last frame the scroll
/// offset stops moving, like a list scrolled to its end.
#[derive(Debug, Clone)]
pub struct ReplaySurface {
    frames: Vec<CaptureFrame>,
    cursor: usize,
    reveals: usize,
}

impl ReplaySurface {
    pub fn new(capture: Capture) -> Self {
        Self {
            frames: capture.frames,
            cursor: 0,
            reveals: 0,
        }
    }

    /// Number of reveal requests received so far
    pub fn reveals(&self) -> usize {
        self.reveals
    }

    /// Index of the frame currently shown
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl EntrySource for ReplaySurface {
    fn observe(&mut self) -> Vec<RawEntry> {
        self.frames
            .get(self.cursor)
            .map(|frame| frame.entries.clone())
            .unwrap_or_default()
    }
}

impl HostSurface for ReplaySurface {
    fn is_scrollable(&self) -> bool {
        !self.frames.is_empty()
    }

    fn scroll_position(&self) -> u64 {
        self.frames
            .get(self.cursor)
            .map_or(0, |frame| frame.scroll_top)
    }

    fn reveal_more(&mut self) {
        self.reveals += 1;
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
    }
}
