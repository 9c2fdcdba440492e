//! Dedup ledger for repeated observation passes
//!
//! The host list is virtualized: the same identity scrolls in and out of view
//! many times during one run. Every identity is resolved exactly once, whatever
//! the parse outcome, and is never retried afterwards.

use crate::entry::Identity;
use fnv::FnvHashSet;
use std::fmt;
use std::ops::RangeInclusive;

/// Runs shown by `Display` before the rest are summarized
const DISPLAY_RUNS: usize = 8;

/// Never-resolved identities as ascending, disjoint inclusive runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityGaps {
    runs: Vec<RangeInclusive<Identity>>,
}

impl IdentityGaps {
    pub fn runs(&self) -> &[RangeInclusive<Identity>] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of missing identities across all runs
    pub fn count(&self) -> u64 {
        self.runs
            .iter()
            .map(|run| u64::from(run.end() - run.start()) + 1)
            .sum()
    }

    /// Missing identities in ascending order, expanded lazily
    pub fn iter(&self) -> impl Iterator<Item = Identity> + '_ {
        self.runs.iter().flat_map(|run| run.clone())
    }
}

impl fmt::Display for IdentityGaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.runs.iter().take(DISPLAY_RUNS).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if run.start() == run.end() {
                write!(f, "{}", run.start())?;
            } else {
                write!(f, "{}-{}", run.start(), run.end())?;
            }
        }
        if self.runs.len() > DISPLAY_RUNS {
            write!(f, ", ... ({} more runs)", self.runs.len() - DISPLAY_RUNS)?;
        }
        Ok(())
    }
}

/// Tracks which identities have already been resolved
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    processed: FnvHashSet<Identity>,
    /// Highest identity marked so far (`None` before the first one)
    max_seen: Option<Identity>,
}

impl DedupLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `identity` has already been resolved
    pub fn is_processed(&self, identity: Identity) -> bool {
        self.processed.contains(&identity)
    }

    /// Retire `identity`; returns `false` if it was already retired
    pub fn mark_processed(&mut self, identity: Identity) -> bool {
        self.max_seen = Some(self.max_seen.map_or(identity, |max| max.max(identity)));
        self.processed.insert(identity)
    }

    /// Identities below the high-water mark that were never resolved
    ///
    /// Identities in `observed` are pending rather than missing and are left out.
    /// Diagnostic only: a gap here means the host skipped rows while scrolling.
    /// Work is proportional to the identities known, not to the high-water mark.
    pub fn missing_identities(&self, observed: &FnvHashSet<Identity>) -> IdentityGaps {
        let Some(max) = self.max_seen else {
            return IdentityGaps::default();
        };

        let mut known: Vec<Identity> = self
            .processed
            .iter()
            .chain(observed.iter().filter(|&&id| id <= max))
            .copied()
            .collect();
        known.sort_unstable();
        known.dedup();

        let mut runs = Vec::new();
        let mut next = 0;
        for id in known {
            if id > next {
                runs.push(next..=id - 1);
            }
            // `max` is always known, so this is the last step when it saturates
            next = id.saturating_add(1);
        }
        IdentityGaps { runs }
    }

    /// Forget everything (fresh collection run)
    pub fn reset(&mut self) {
        self.processed.clear();
        self.max_seen = None;
    }

    /// Highest identity resolved so far
    pub fn max_identity_seen(&self) -> Option<Identity> {
        self.max_seen
    }

    /// Number of resolved identities
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}
