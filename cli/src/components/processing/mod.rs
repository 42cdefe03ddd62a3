//! Generic resource processing loop: check state, apply or remove, collect stats.
//!
//! [`apply`] holds the single-resource steps (`process_single`,
//! `apply_resource`, `remove_single`).

mod apply;

use anyhow::Result;

use super::Context;
use crate::resources::Resource;

/// Result of a single component run.
///
/// # Examples
///
/// ```
/// use postinstall_cli::components::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("already installed".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Component reached its desired state.
    Ok,
    /// Component had nothing to do.
    Skipped(String),
    /// Component ran in dry-run mode.
    DryRun,
}

/// Counters for components that process several resources.
///
/// # Examples
///
/// ```
/// use postinstall_cli::components::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of resources changed or removed.
    pub changed: u32,
    /// Number of resources already in the requested state.
    pub already_ok: u32,
    /// Number of resources skipped (invalid, or modified since install).
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the matching [`TaskResult`].
    ///
    /// A run that changed nothing reports [`TaskResult::Skipped`] so the
    /// summary distinguishes "installed now" from "was already installed".
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else if self.changed == 0 {
            TaskResult::Skipped("nothing to change".to_string())
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Configuration for the generic resource processing loop.
///
/// # Examples
///
/// ```
/// use postinstall_cli::components::ProcessOpts;
///
/// let opts = ProcessOpts::apply_all("install");
/// assert!(opts.fix_incorrect && opts.fix_missing && opts.bail_on_error);
///
/// let opts = ProcessOpts::apply_all("write").skip_missing().no_bail();
/// assert!(opts.fix_incorrect && !opts.fix_missing && !opts.bail_on_error);
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "install", "write", "enable").
    pub verb: &'a str,
    /// Treat `Incorrect` as fixable (apply the change). If `false`, skip it.
    pub fix_incorrect: bool,
    /// Treat `Missing` as fixable (apply the change). If `false`, skip it.
    pub fix_missing: bool,
    /// Propagate errors from `apply()` (bail). If `false`, warn and count as skipped.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Fix both missing and incorrect resources, bailing on errors.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: true,
            fix_missing: true,
            bail_on_error: true,
        }
    }

    /// Warn on errors instead of bailing.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }

    /// Skip missing resources (only fix incorrect ones).
    #[must_use]
    pub const fn skip_missing(mut self) -> Self {
        self.fix_missing = false;
        self
    }
}

/// Bring each resource to its desired state, in order, and return the counts.
///
/// # Errors
///
/// Returns an error if a state probe fails, or if an apply fails while
/// `opts.bail_on_error` is set.
pub fn apply_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += apply::process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats)
}

/// [`apply_resources`], then log the summary.
///
/// # Errors
///
/// See [`apply_resources`].
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    Ok(apply_resources(ctx, resources, opts)?.finish(ctx))
}

/// Remove each resource, in order, and return the counts.
///
/// Only resources whose state passes [`Resource::removable`] are touched.
/// A removable target modified since installation is still removed, with a
/// warning.
///
/// # Errors
///
/// Returns an error if a state probe or a removal fails.
pub fn remove_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += apply::remove_single(ctx, &resource, &current, verb)?;
    }
    Ok(stats)
}

/// [`remove_resources`], then log the summary.
///
/// # Errors
///
/// See [`remove_resources`].
pub fn process_resources_remove<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    Ok(remove_resources(ctx, resources, verb)?.finish(ctx))
}
