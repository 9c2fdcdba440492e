use anyhow::Result;
use callsweep::cli::{Cli, OutputFormat};
use callsweep::collector::{
    Clock, Collector, FixedClock, HostIo, NoPacer, Pacer, ReportSink, RunSummary, Session,
    SleepPacer, StatusFeed, SystemClock, TracingStatus,
};
use callsweep::config::CollectorConfig;
use callsweep::error::CollectError;
use callsweep::interrupt::cancel_on_interrupt;
use callsweep::replay::{Capture, ReplaySurface};
use callsweep::report::ReportOrdering;
use callsweep::sink::{CsvFileSink, JsonSink};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Progress lines on stderr, keeping stdout free for JSON output
struct StderrStatus;

impl StatusFeed for StderrStatus {
    fn publish(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Print run diagnostics to stderr
fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    eprintln!(
        "rounds: {}, processed: {}, accepted: {}, not missed: {}, out of window: {}, unparseable: {}",
        stats.rounds,
        stats.processed,
        stats.accepted,
        stats.rejected_not_missed,
        stats.rejected_out_of_window,
        stats.rejected_unparseable
    );
    if stats.cancelled {
        eprintln!("run was cancelled before the list settled");
    }
    if !summary.missing_identities.is_empty() {
        eprintln!(
            "{} entries were never observed: {}",
            summary.missing_identities.count(),
            summary.missing_identities
        );
    }
}

/// Host collaborators shared by both output formats
struct Host {
    surface: ReplaySurface,
    pacer: Box<dyn Pacer>,
    clock: Box<dyn Clock>,
    status: Box<dyn StatusFeed>,
}

/// Replay the capture into `sink`; `None` when nothing qualified
fn collect(
    collector: &Collector,
    host: &mut Host,
    sink: &mut dyn ReportSink,
) -> Result<Option<RunSummary>> {
    let mut session = Session::new();
    cancel_on_interrupt(session.cancel_token())?;

    let mut io = HostIo {
        surface: &mut host.surface,
        status: host.status.as_mut(),
        sink,
        pacer: host.pacer.as_mut(),
        clock: host.clock.as_ref(),
    };

    match collector.run(&mut session, &mut io) {
        Ok(summary) => Ok(Some(summary)),
        Err(CollectError::EmptyReport) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let mut config = match &args.config {
        Some(path) => CollectorConfig::from_file(path)?,
        None => CollectorConfig::default(),
    };
    if args.chronological {
        config.ordering = ReportOrdering::Chronological;
    }
    let collector = Collector::new(config);

    let capture = Capture::from_file(&args.capture)?;
    let mut host = Host {
        surface: ReplaySurface::new(capture),
        pacer: if args.paced {
            Box::new(SleepPacer::default())
        } else {
            Box::new(NoPacer)
        },
        clock: match args.now {
            Some(now) => Box::new(FixedClock(now)),
            None => Box::new(SystemClock),
        },
        // With --debug, status lines join the tracing output
        status: if args.debug {
            Box::new(TracingStatus)
        } else {
            Box::new(StderrStatus)
        },
    };

    match args.format {
        OutputFormat::Csv => {
            let mut sink = CsvFileSink::new(&args.output_dir);
            if let Some(summary) = collect(&collector, &mut host, &mut sink)? {
                print_summary(&summary);
                if let Some(path) = sink.written() {
                    eprintln!("wrote {}", path.display());
                }
            }
        }
        OutputFormat::Json => {
            let mut sink = JsonSink::new(std::io::stdout());
            if let Some(summary) = collect(&collector, &mut host, &mut sink)? {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}
