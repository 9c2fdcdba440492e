//! Collection state machine
//!
//! Drives the Idle → Collecting → Finalizing → Idle cycle over a host surface
//! that only renders a sliding window of the call list. Each collecting round:
//!
//! 1. observe the visible window and resolve unseen identities
//! 2. ask the host to reveal more rows
//! 3. wait for scrolling to settle and rows to load
//! 4. feed the round into [`StopCondition`]
//!
//! Finalizing does one last observe pass, builds the report and hands it to
//! the sink.
//!
//! The run is cooperative and single-threaded. Only the [`CancelToken`] may be
//! shared with other threads; it is checked between rounds, never mid-round.

use crate::config::CollectorConfig;
use crate::entry::{Identity, RawEntry};
use crate::error::CollectError;
use crate::ledger::{DedupLedger, IdentityGaps};
use crate::parser::{is_within_time_range, CallRecord, EntryParser, ParseOutcome};
use crate::report::{build_report, total_calls, ReportRow};
use chrono::{Local, NaiveDateTime};
use fnv::FnvHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle of a collection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectorState {
    #[default]
    Idle,
    Collecting,
    Finalizing,
}

/// Cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run finalizes after the current round
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Source of the currently visible rows
pub trait EntrySource {
    /// Visible rows in display order
    fn observe(&mut self) -> Vec<RawEntry>;
}

/// Scrollable host list
pub trait HostSurface: EntrySource {
    /// Whether a scrollable call list exists at all
    fn is_scrollable(&self) -> bool;

    /// Current scroll offset
    fn scroll_position(&self) -> u64;

    /// Ask the host to render more rows. Completion is not signalled.
    fn reveal_more(&mut self);
}

/// Fire-and-forget progress messages
pub trait StatusFeed {
    fn publish(&mut self, message: &str);
}

/// Destination of the finished report
pub trait ReportSink {
    /// `generated_at` is the instant the final pass resolved timestamps against
    fn deliver(&mut self, rows: &[ReportRow], generated_at: NaiveDateTime) -> std::io::Result<()>;
}

/// Timed waits between rounds
pub trait Pacer {
    /// Wait up to `duration`, returning early once `cancel` is set
    fn pause(&mut self, duration: Duration, cancel: &CancelToken);
}

/// Wall-clock source for timestamp resolution
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Sleeps in short slices so cancellation is noticed promptly
#[derive(Debug, Clone)]
pub struct SleepPacer {
    slice: Duration,
}

impl Default for SleepPacer {
    fn default() -> Self {
        Self {
            slice: Duration::from_millis(50),
        }
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self, duration: Duration, cancel: &CancelToken) {
        let deadline = Instant::now() + duration;
        while !cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(self.slice));
        }
    }
}

/// Never waits (captured surfaces, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pause(&mut self, _duration: Duration, _cancel: &CancelToken) {}
}

/// Routes status messages to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl StatusFeed for TracingStatus {
    fn publish(&mut self, message: &str) {
        info!(target: "callsweep::status", "{}", message);
    }
}

impl StatusFeed for Vec<String> {
    fn publish(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Host collaborators for one run
pub struct HostIo<'a> {
    pub surface: &'a mut dyn HostSurface,
    pub status: &'a mut dyn StatusFeed,
    pub sink: &'a mut dyn ReportSink,
    pub pacer: &'a mut dyn Pacer,
    pub clock: &'a dyn Clock,
}

/// What one round looked like, as far as stopping is concerned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundObservation {
    /// Some visible row had a today/yesterday timestamp shape
    pub any_recent_visible: bool,
    /// Identities resolved for the first time this round
    pub newly_processed: usize,
    /// Scroll offset moved forward after the reveal request
    pub scroll_advanced: bool,
}

impl RoundObservation {
    /// The scroll did not move and the window offered nothing new and recent
    pub fn is_unproductive(&self) -> bool {
        !self.scroll_advanced && (!self.any_recent_visible || self.newly_processed == 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundVerdict {
    Continue,
    Stop,
}

/// Consecutive-unproductive-round counter
///
/// Pure state transition, independent of how rounds are paced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCondition {
    threshold: u32,
    unproductive: u32,
}

impl StopCondition {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            unproductive: 0,
        }
    }

    pub fn record_round(&mut self, round: RoundObservation) -> RoundVerdict {
        if round.is_unproductive() {
            self.unproductive += 1;
        } else {
            self.unproductive = 0;
        }

        if self.unproductive >= self.threshold {
            RoundVerdict::Stop
        } else {
            RoundVerdict::Continue
        }
    }

    pub fn unproductive_rounds(&self) -> u32 {
        self.unproductive
    }
}

/// Result of feeding one observed window through parser and ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub newly_processed: usize,
    pub newly_accepted: usize,
    pub any_recent_visible: bool,
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rounds: u32,
    pub processed: usize,
    pub accepted: usize,
    pub rejected_not_missed: usize,
    pub rejected_out_of_window: usize,
    pub rejected_unparseable: usize,
    pub cancelled: bool,
}

impl RunStats {
    fn record(&mut self, outcome: &ParseOutcome) {
        self.processed += 1;
        match outcome {
            ParseOutcome::Accepted(_) => self.accepted += 1,
            ParseOutcome::RejectedNotMissedCall => self.rejected_not_missed += 1,
            ParseOutcome::RejectedOutOfWindow => self.rejected_out_of_window += 1,
            ParseOutcome::RejectedUnparseable(_) => self.rejected_unparseable += 1,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: RunStats,
    /// Identities below the high-water mark that were never seen
    pub missing_identities: IdentityGaps,
    pub rows: Vec<ReportRow>,
}

impl RunSummary {
    pub fn total_calls(&self) -> u64 {
        total_calls(&self.rows)
    }
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Started,
    CancelRequested,
}

/// Result of advancing the state machine by one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do: no run in progress
    Idle,
    Continue,
    Finished(RunSummary),
}

/// State of one collector: accepted records, ledger and last status
///
/// Not safe for concurrent mutation; drive it from a single flow and share
/// only the [`CancelToken`].
#[derive(Debug, Default)]
pub struct Session {
    pub records: Vec<CallRecord>,
    pub ledger: DedupLedger,
    pub status: String,
    state: CollectorState,
    stats: RunStats,
    stop: Option<StopCondition>,
    cancel: CancelToken,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Handle for cancelling the run from elsewhere
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn begin(&mut self, stop_threshold: u32) {
        self.records.clear();
        self.ledger.reset();
        self.status.clear();
        self.stats = RunStats::default();
        self.stop = Some(StopCondition::new(stop_threshold));
        self.cancel.reset();
        self.state = CollectorState::Collecting;
    }

    fn publish(&mut self, feed: &mut dyn StatusFeed, message: String) {
        feed.publish(&message);
        self.status = message;
    }

    /// Resolve every not-yet-processed entry of one observed window
    ///
    /// Every resolved identity is retired whatever the outcome, so observing
    /// the same window again is a no-op.
    pub fn observe(
        &mut self,
        parser: &EntryParser,
        entries: &[RawEntry],
        now: NaiveDateTime,
    ) -> PassOutcome {
        let mut pass = PassOutcome::default();

        for entry in entries {
            if entry.timestamp.as_deref().is_some_and(is_within_time_range) {
                pass.any_recent_visible = true;
            }
            if self.ledger.is_processed(entry.identity) {
                continue;
            }

            let outcome = parser.parse(entry, now);
            self.ledger.mark_processed(entry.identity);
            self.stats.record(&outcome);
            pass.newly_processed += 1;

            match outcome {
                ParseOutcome::Accepted(record) => {
                    pass.newly_accepted += 1;
                    self.records.push(record);
                }
                ParseOutcome::RejectedUnparseable(err) => {
                    debug!(identity = entry.identity, %err, "skipping entry");
                }
                ParseOutcome::RejectedOutOfWindow => {
                    debug!(identity = entry.identity, "entry outside recent window");
                }
                ParseOutcome::RejectedNotMissedCall => {}
            }
        }

        pass
    }
}

/// Drives sessions through the collection state machine
#[derive(Debug, Clone)]
pub struct Collector {
    config: CollectorConfig,
    parser: EntryParser,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        let parser = EntryParser::new(config.missed_call_signal.clone());
        Self { config, parser }
    }

    /// Start a fresh run when idle, otherwise request cancellation
    pub fn toggle(
        &self,
        session: &mut Session,
        io: &mut HostIo<'_>,
    ) -> Result<ToggleAction, CollectError> {
        if session.state() == CollectorState::Idle {
            self.start(session, io)?;
            Ok(ToggleAction::Started)
        } else {
            info!("cancellation requested");
            session.cancel.cancel();
            Ok(ToggleAction::CancelRequested)
        }
    }

    /// Clear all session state and enter `Collecting`
    ///
    /// Fails without leaving `Idle` when the host has no scrollable list.
    pub fn start(&self, session: &mut Session, io: &mut HostIo<'_>) -> Result<(), CollectError> {
        if session.state() != CollectorState::Idle {
            return Err(CollectError::AlreadyCollecting);
        }
        if !io.surface.is_scrollable() {
            session.publish(io.status, "Could not find the call list to scroll".to_string());
            return Err(CollectError::NoScrollableSurfaceFound);
        }

        session.begin(self.config.stop_threshold);
        info!("collection started");
        session.publish(io.status, "Collecting missed calls...".to_string());
        Ok(())
    }

    /// Advance the state machine by one round (or the final pass)
    pub fn step(&self, session: &mut Session, io: &mut HostIo<'_>) -> Result<Step, CollectError> {
        match session.state() {
            CollectorState::Idle => Ok(Step::Idle),
            CollectorState::Collecting => {
                self.collect_round(session, io);
                Ok(Step::Continue)
            }
            CollectorState::Finalizing => self.finalize(session, io).map(Step::Finished),
        }
    }

    /// Run a whole collection cycle, starting it if the session is idle
    pub fn run(&self, session: &mut Session, io: &mut HostIo<'_>) -> Result<RunSummary, CollectError> {
        if session.state() == CollectorState::Idle {
            self.start(session, io)?;
        }

        loop {
            match self.step(session, io)? {
                Step::Finished(summary) => return Ok(summary),
                Step::Continue => {}
                Step::Idle => return Err(CollectError::NotCollecting),
            }
        }
    }

    fn collect_round(&self, session: &mut Session, io: &mut HostIo<'_>) {
        if session.cancel.is_cancelled() {
            info!(rounds = session.stats.rounds, "run cancelled, finalizing");
            session.stats.cancelled = true;
            session.state = CollectorState::Finalizing;
            return;
        }

        let entries = io.surface.observe();
        let pass = session.observe(&self.parser, &entries, io.clock.now());
        session.stats.rounds += 1;

        let message = format!(
            "Collected {} missed calls ({} entries processed)",
            session.records.len(),
            session.ledger.len()
        );
        session.publish(io.status, message);

        let before = io.surface.scroll_position();
        io.surface.reveal_more();
        io.pacer.pause(self.config.settle_delay(), &session.cancel);
        io.pacer.pause(self.config.load_delay(), &session.cancel);
        let after = io.surface.scroll_position();

        let round = RoundObservation {
            any_recent_visible: pass.any_recent_visible,
            newly_processed: pass.newly_processed,
            scroll_advanced: after > before,
        };
        let stop = session
            .stop
            .get_or_insert_with(|| StopCondition::new(self.config.stop_threshold));
        let verdict = stop.record_round(round);

        debug!(
            round = session.stats.rounds,
            new = pass.newly_processed,
            accepted = pass.newly_accepted,
            scroll = after,
            unproductive = stop.unproductive_rounds(),
            "round complete"
        );

        if verdict == RoundVerdict::Stop {
            info!(rounds = session.stats.rounds, "list settled, finalizing");
            session.state = CollectorState::Finalizing;
        } else if session.stats.rounds >= self.config.max_rounds {
            warn!(
                max_rounds = self.config.max_rounds,
                "round cap reached before the list settled, finalizing"
            );
            session.state = CollectorState::Finalizing;
        }
    }

    fn finalize(&self, session: &mut Session, io: &mut HostIo<'_>) -> Result<RunSummary, CollectError> {
        let now = io.clock.now();
        let entries = io.surface.observe();
        session.observe(&self.parser, &entries, now);

        let rows = build_report(&session.records, self.config.ordering);
        session.state = CollectorState::Idle;

        info!(
            processed = session.stats.processed,
            accepted = session.stats.accepted,
            not_missed = session.stats.rejected_not_missed,
            out_of_window = session.stats.rejected_out_of_window,
            unparseable = session.stats.rejected_unparseable,
            rows = rows.len(),
            "collection finished"
        );

        if rows.is_empty() {
            session.publish(
                io.status,
                "No missed calls found from today or yesterday".to_string(),
            );
            report_gaps(&session.ledger, &entries);
            return Err(CollectError::EmptyReport);
        }

        io.sink.deliver(&rows, now)?;

        let message = format!(
            "Report ready: {} rows, {} missed calls",
            rows.len(),
            total_calls(&rows)
        );
        session.publish(io.status, message);

        Ok(RunSummary {
            stats: session.stats.clone(),
            missing_identities: report_gaps(&session.ledger, &entries),
            rows,
        })
    }
}

/// Identities the host never showed, logged as a warning when present
fn report_gaps(ledger: &DedupLedger, visible: &[RawEntry]) -> IdentityGaps {
    let observed: FnvHashSet<Identity> = visible.iter().map(|e| e.identity).collect();
    let gaps = ledger.missing_identities(&observed);
    if !gaps.is_empty() {
        warn!(count = gaps.count(), "identities never observed: {}", gaps);
    }
    gaps
}
