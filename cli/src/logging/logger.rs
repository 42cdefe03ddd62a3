//! Structured logger with dry-run awareness and summary collection.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET, SUMMARY_TARGET};
use super::types::{ComponentEntry, ComponentStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message is also appended to the run log at
/// `$XDG_STATE_HOME/postinstall/<log name>.log` (default
/// `~/.local/state/postinstall/`), regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    components: Mutex<Vec<ComponentEntry>>,
    log_file: PathBuf,
}

impl Logger {
    /// Create a logger for the run log `log_name` (see
    /// [`log_name`](super::log_name)).
    ///
    /// The path is only shown in the summary; the file itself is opened by
    /// [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(log_name: &str) -> Self {
        Self::with_log_file(log_file_path(log_name))
    }

    pub(crate) const fn with_log_file(log_file: PathBuf) -> Self {
        Self {
            components: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Path of the run log.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_file
    }

    /// Return a clone of all recorded component entries.
    #[must_use]
    pub fn entries(&self) -> Vec<ComponentEntry> {
        self.components.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a component result for the summary.
    pub fn record_component(&self, name: &str, status: ComponentStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.components.lock() {
            guard.push(ComponentEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print the summary of all recorded components.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for entry in &entries {
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            tracing::info!(
                target: SUMMARY_TARGET,
                status = entry.status.label(),
                "{} {}{suffix}",
                entry.status.icon(),
                entry.name
            );
        }

        println!();
        self.info(&totals(&entries));
        self.info(&format!("log: {}", self.log_file.display()));
    }
}

/// `5 components: 3 ok, 1 failed, 1 not run`, omitting empty counts.
fn totals(entries: &[ComponentEntry]) -> String {
    let counts: Vec<String> = [
        ComponentStatus::Ok,
        ComponentStatus::Skipped,
        ComponentStatus::DryRun,
        ComponentStatus::Failed,
        ComponentStatus::NotRun,
    ]
    .into_iter()
    .filter_map(|status| {
        let n = entries.iter().filter(|e| e.status == status).count();
        (n > 0).then(|| format!("{n} {}", status.label()))
    })
    .collect();
    let noun = if entries.len() == 1 { "component" } else { "components" };
    format!("{} {noun}: {}", entries.len(), counts.join(", "))
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_component(&self, name: &str, status: ComponentStatus, message: Option<&str>) {
        self.record_component(name, status, message);
    }
}
