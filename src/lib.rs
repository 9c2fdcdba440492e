//! Callsweep - missed-call extraction and hourly aggregation
//!
//! This library walks a virtualized, lazily-rendered call list, picks out the
//! missed calls from today and yesterday, deduplicates them across repeated
//! observation passes and folds them into an hourly report per phone number.
//!
//! The pieces:
//! - [`parser`] turns one observed row into a [`parser::CallRecord`] or a rejection
//! - [`ledger`] makes repeated passes over the same rows idempotent
//! - [`report`] buckets accepted records by phone number and clock hour
//! - [`collector`] runs the observe / reveal-more loop until the list settles
//! - [`interrupt`] turns Ctrl+C into a cooperative cancel of the running collection
//!
//! Host-specific I/O (the list itself, status display, report delivery) sits
//! behind the traits in [`collector`]; [`replay`] and [`sink`] provide the
//! file-based implementations used by the `callsweep` binary.

pub mod cli;
pub mod collector;
pub mod config;
pub mod csv_output;
pub mod entry;
pub mod error;
pub mod interrupt;
pub mod json_output;
pub mod ledger;
pub mod parser;
pub mod replay;
pub mod report;
pub mod sink;
