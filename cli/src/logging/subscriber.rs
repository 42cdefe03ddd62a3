//! Rendering of [`tracing`] events to the console and to the run log.
//!
//! Messages never carry colour codes. The console formatter adds them from
//! the event kind (and, for summary lines, the component status), so the log
//! file gets the same lines in plain text.
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{log_file_path, timestamp};

/// Target of stage headers.
pub(super) const STAGE_TARGET: &str = "postinstall::stage";
/// Target of actions skipped by `--dry-run`.
pub(super) const DRY_RUN_TARGET: &str = "postinstall::dry_run";
/// Target of per-component summary lines; they carry a `status` field.
pub(super) const SUMMARY_TARGET: &str = "postinstall::summary";

/// How an event is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Summary,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, SUMMARY_TARGET) => Self::Summary,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// The fields postinstall events carry.
#[derive(Debug, Default)]
struct Fields {
    message: String,
    status: Option<String>,
}

impl Fields {
    fn of(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }
}

fn status_color(status: Option<&str>) -> &'static str {
    match status {
        Some("ok") => "\x1b[32m",
        Some("skipped") => "\x1b[33m",
        Some("dry-run") => "\x1b[37m",
        Some("failed") => "\x1b[31m",
        _ => "\x1b[2m",
    }
}

/// Console line for an event.
fn console_line(kind: Kind, fields: &Fields) -> String {
    let msg = &fields.message;
    match kind {
        Kind::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        Kind::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        Kind::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        Kind::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        Kind::Summary => format!("  {}{msg}\x1b[0m", status_color(fields.status.as_deref())),
        Kind::Info => format!("  {msg}"),
        Kind::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// Log-file line for an event, without the timestamp.
fn file_line(kind: Kind, fields: &Fields) -> String {
    let msg = &fields.message;
    match kind {
        Kind::Stage => format!("==> {msg}"),
        Kind::DryRun => format!("    [dry run] {msg}"),
        Kind::Error => format!("    [error] {msg}"),
        Kind::Warn => format!("    [warn] {msg}"),
        Kind::Debug => format!("    [debug] {msg}"),
        Kind::Summary | Kind::Info => format!("    {msg}"),
    }
}

/// Appends every event to the run log, whatever the console verbosity.
///
/// Logs are never truncated: each run opens with a header line, so the log
/// of `install-kernel` holds every kernel install made on this machine.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open `path` for appending and write the run header.
    ///
    /// Returns `None` if the directory or the file cannot be created; the run
    /// then goes on with console output only.
    pub(super) fn open(path: &Path) -> Option<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok()?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()?;
        let version =
            option_env!("POSTINSTALL_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        writeln!(
            file,
            "=== {} postinstall {version}",
            timestamp("%Y-%m-%d %H:%M:%S")
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = file_line(Kind::of(event.metadata()), &Fields::of(event));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {line}", timestamp("%H:%M:%S")).ok();
        }
    }
}

/// Console formatter for postinstall events.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        writeln!(
            writer,
            "{}",
            console_line(Kind::of(event.metadata()), &Fields::of(event))
        )
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout. All events,
/// `debug` included, are appended to the run log named `log_name` (see
/// [`log_name`](super::log_name)). Must be called once, before any logging.
pub fn init_subscriber(verbose: bool, log_name: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer =
        FileLayer::open(&log_file_path(log_name)).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
