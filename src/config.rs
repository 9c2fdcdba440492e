//! Collector configuration
//!
//! All fields have defaults, so an empty TOML file (or no file at all) yields
//! the stock behavior.
//!
//! ```
//! use callsweep::config::CollectorConfig;
//!
//! let config = CollectorConfig::from_toml_str("stop_threshold = 5").unwrap();
//! assert_eq!(config.stop_threshold, 5);
//! assert_eq!(config.missed_call_signal, "Missed call");
//! ```

use crate::entry::DEFAULT_MISSED_CALL_SIGNAL;
use crate::report::ReportOrdering;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for a collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Consecutive unproductive rounds before the run finalizes
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: u32,

    /// Hard cap on rounds in case the host never settles
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Wait after a reveal-more request for scrolling to settle (ms)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Wait for newly revealed rows to render (ms)
    #[serde(default = "default_load_delay")]
    pub load_delay_ms: u64,

    /// Content text that marks a row as a missed call
    #[serde(default = "default_missed_call_signal")]
    pub missed_call_signal: String,

    /// Final row ordering of the report
    pub ordering: ReportOrdering,
}

fn default_stop_threshold() -> u32 {
    3
}

fn default_max_rounds() -> u32 {
    10_000
}

fn default_settle_delay() -> u64 {
    500
}

fn default_load_delay() -> u64 {
    1000
}

fn default_missed_call_signal() -> String {
    DEFAULT_MISSED_CALL_SIGNAL.to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            stop_threshold: default_stop_threshold(),
            max_rounds: default_max_rounds(),
            settle_delay_ms: default_settle_delay(),
            load_delay_ms: default_load_delay(),
            missed_call_signal: default_missed_call_signal(),
            ordering: ReportOrdering::default(),
        }
    }
}

impl CollectorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stop before the first round or never stop
    pub fn validate(&self) -> Result<()> {
        if self.stop_threshold == 0 {
            bail!("stop_threshold must be >= 1");
        }
        if self.max_rounds == 0 {
            bail!("max_rounds must be >= 1");
        }
        if self.missed_call_signal.is_empty() {
            bail!("missed_call_signal must not be empty");
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}
