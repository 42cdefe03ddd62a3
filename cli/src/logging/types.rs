//! Core logging types: component entries, status, and the [`Log`] trait.

/// Per-component result for summary reporting.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    /// Component name.
    pub name: String,
    /// Final status of the component.
    pub status: ComponentStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a component at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    /// Component reached its desired state.
    Ok,
    /// Component was skipped (e.g., already in the requested state).
    Skipped,
    /// Component ran in dry-run mode; no changes were applied.
    DryRun,
    /// Component failed; the run stopped here.
    Failed,
    /// Component was selected but not attempted because an earlier one failed.
    NotRun,
}

impl ComponentStatus {
    /// Summary glyph.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Skipped => "○",
            Self::DryRun => "~",
            Self::Failed => "✗",
            Self::NotRun => "·",
        }
    }

    /// Lower-case name, as used in the summary totals.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
            Self::NotRun => "not run",
        }
    }
}

/// Abstraction over logging backends so components can be exercised with a
/// logger that writes to a temporary directory.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a component result for the summary.
    fn record_component(&self, name: &str, status: ComponentStatus, message: Option<&str>);
}
