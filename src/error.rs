//! Error taxonomy for entry parsing and collection runs

use thiserror::Error;

/// Per-entry failures
///
/// These never abort a run. The offending identity is retired in the ledger and
/// the error only shows up in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("unparseable timestamp: {0:?}")]
    UnparseableTimestamp(String),

    #[error("unparseable phone number: {0:?}")]
    UnparseablePhoneNumber(String),

    #[error("entry is missing its {0} element")]
    MissingRequiredField(&'static str),
}

/// Run-level failures
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no scrollable call list found on the host surface")]
    NoScrollableSurfaceFound,

    #[error("no missed calls found in the recent time window")]
    EmptyReport,

    #[error("a collection run is already in progress")]
    AlreadyCollecting,

    #[error("no collection run in progress")]
    NotCollecting,

    #[error("report delivery failed: {0}")]
    Sink(#[from] std::io::Error),
}
