//! Run orchestration: turn the command line into a validated [`Invocation`],
//! gate it on preflight checks, run the selected components in registry
//! order, then bring the shell environment in line.
pub mod install;
pub mod status;
pub mod uninstall;

use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::Cli;
use crate::components::{self, Component, Context, Requirements, TaskResult};
use crate::config::Config;
use crate::environment::{EnvironmentPatch, EnvironmentTarget};
use crate::error::{PostinstallError, StepFailure, ValidationError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{ComponentStatus, Log, Logger};
use crate::platform::Platform;
use crate::preflight::{self, Preflight, SystemPreflight};
use crate::resources::ResourceChange;

/// File whose presence identifies an asset directory.
const ASSET_MARKER: &str = "starship/starship.toml";

/// What a run does with its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bring components to their installed state.
    Install,
    /// Undo previous installs.
    Uninstall,
    /// Report the probed state only.
    Status,
}

impl Mode {
    /// Name used for the log file and in failure reports.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Status => "status",
        }
    }

    /// Mode implied by the raw arguments, before validation.
    #[must_use]
    pub fn guess(args: &[String], status: bool) -> Self {
        if args.first().is_some_and(|a| a == "uninstall") {
            Self::Uninstall
        } else if status {
            Self::Status
        } else {
            Self::Install
        }
    }
}

/// A validated request: one mode and the selected components in registry
/// order.
pub struct Invocation {
    /// Requested mode.
    pub mode: Mode,
    /// Selected components, deduplicated and in registry order.
    pub components: Vec<Box<dyn Component>>,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("Invocation")
            .field("mode", &self.mode)
            .field("components", &names)
            .finish()
    }
}

impl Invocation {
    /// Validate positional arguments (`[uninstall] <COMPONENT>...`).
    ///
    /// `--status` without components selects every component.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for unknown names, a misplaced or empty
    /// `uninstall`, or `--status` combined with `uninstall`.
    pub fn parse(args: &[String], status: bool) -> Result<Self, ValidationError> {
        let mode = Mode::guess(args, status);
        let names = match mode {
            Mode::Uninstall => args.get(1..).unwrap_or_default(),
            Mode::Install | Mode::Status => args,
        };
        if names.iter().any(|a| a == "uninstall") {
            return Err(ValidationError::MisplacedUninstall);
        }
        if mode == Mode::Uninstall {
            if status {
                return Err(ValidationError::ConflictingFlags(
                    "--status".to_string(),
                    "uninstall".to_string(),
                ));
            }
            if names.is_empty() {
                return Err(ValidationError::NothingToUninstall);
            }
        }
        let components = if mode == Mode::Status && names.is_empty() {
            components::registry()
        } else {
            components::resolve(names)?
        };
        Ok(Self { mode, components })
    }

    /// Names of the selected components.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Name of this run's log, scoped to the selected components.
    #[must_use]
    pub fn log_name(&self) -> String {
        crate::logging::log_name(self.mode.command(), &self.names())
    }
}

/// Wire the host system into a [`Context`] and run `invocation`.
///
/// # Errors
///
/// Returns an error if configuration or assets cannot be loaded, or the run
/// itself fails (see [`run`]).
pub fn execute(cli: &Cli, invocation: &Invocation, log: &Arc<Logger>) -> Result<()> {
    let version = option_env!("POSTINSTALL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.debug(&format!("postinstall {version}"));

    let config = Config::load(cli.config.as_deref())?;
    let assets = resolve_assets(cli.assets.as_deref(), &config)?;
    log.debug(&format!("assets: {}", assets.display()));
    let platform = Platform::detect();
    log.info(&format!("platform: {} ({})", platform.pretty_name, platform.family));

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let preflight = SystemPreflight::new(Arc::clone(&executor));
    let ctx = Context::new(
        config,
        platform,
        Arc::clone(log) as Arc<dyn Log>,
        cli.dry_run,
        executor,
        assets,
    );
    run(invocation, &ctx, &preflight)?;
    Ok(())
}

/// Run `invocation` against `ctx`.
///
/// # Errors
///
/// Returns the first [`PostinstallError`]: an irreversible uninstall or an
/// unmet requirement before anything changes, or the first failing
/// component.
pub fn run(
    invocation: &Invocation,
    ctx: &Context,
    preflight: &dyn Preflight,
) -> Result<(), PostinstallError> {
    match invocation.mode {
        Mode::Install => install::run(ctx, preflight, &invocation.components),
        Mode::Uninstall => uninstall::run(ctx, preflight, &invocation.components),
        Mode::Status => status::run(ctx, &invocation.components),
    }
}

/// Combined requirements of `components`, checked before any side effect.
fn check_requirements(
    ctx: &Context,
    preflight: &dyn Preflight,
    requirements: Requirements,
) -> Result<(), PostinstallError> {
    if requirements.is_empty() {
        return Ok(());
    }
    ctx.log.stage("Checking requirements");
    ctx.log.debug(&format!(
        "privilege: {}, network: {}, disk space: {}",
        requirements.privilege, requirements.network, requirements.disk_space
    ));
    preflight::check(preflight, requirements, &ctx.config.preflight)?;
    Ok(())
}

/// Run each component in order; the first failure stops the run and the
/// remaining components are recorded as not run.
fn run_components(
    ctx: &Context,
    components: &[Box<dyn Component>],
    mode: Mode,
) -> Result<(), StepFailure> {
    let mut remaining = components.iter();
    while let Some(component) = remaining.next() {
        let name = component.name();
        let result = match mode {
            Mode::Uninstall => {
                ctx.log.stage(&format!("Uninstalling {name}"));
                component.uninstall(ctx)
            }
            Mode::Install | Mode::Status => {
                ctx.log.stage(&format!("Installing {name}"));
                component.install(ctx)
            }
        };
        match result {
            Ok(TaskResult::Ok) => ctx.log.record_component(name, ComponentStatus::Ok, None),
            Ok(TaskResult::Skipped(reason)) => {
                ctx.log.info(&format!("skipped: {reason}"));
                ctx.log
                    .record_component(name, ComponentStatus::Skipped, Some(&reason));
            }
            Ok(TaskResult::DryRun) => {
                ctx.log.record_component(name, ComponentStatus::DryRun, None);
            }
            Err(source) => {
                ctx.log.error(&format!("{name}: {source:#}"));
                ctx.log
                    .record_component(name, ComponentStatus::Failed, Some(&format!("{source:#}")));
                for rest in remaining {
                    ctx.log
                        .record_component(rest.name(), ComponentStatus::NotRun, None);
                }
                return Err(StepFailure {
                    component: name.to_string(),
                    operation: mode.command(),
                    source,
                });
            }
        }
    }
    Ok(())
}

/// Merged environment of every component that is selected for install, or
/// installed and not selected for uninstall.
///
/// # Errors
///
/// Returns an error if probing an unselected component fails.
pub fn environment_patch(
    ctx: &Context,
    selected: &[Box<dyn Component>],
    mode: Mode,
) -> Result<EnvironmentPatch> {
    let is_selected = |name: &str| selected.iter().any(|c| c.name() == name);
    let mut patch = EnvironmentPatch::default();
    for component in components::registry() {
        let contribution = component.environment(ctx);
        if contribution.is_empty() {
            continue;
        }
        let wanted = match (mode, is_selected(component.name())) {
            (Mode::Install, true) => true,
            (Mode::Uninstall, true) => false,
            _ => component
                .is_installed(ctx)
                .with_context(|| format!("probing {}", component.name()))?,
        };
        if wanted {
            patch.merge(contribution);
        }
    }
    Ok(patch)
}

/// Write the merged environment snippet and its rc source line.
fn update_environment(
    ctx: &Context,
    selected: &[Box<dyn Component>],
    mode: Mode,
) -> Result<(), StepFailure> {
    let failed = |source: anyhow::Error| StepFailure {
        component: "shell environment".to_string(),
        operation: mode.command(),
        source,
    };
    ctx.log.stage("Updating shell environment");
    let patch = environment_patch(ctx, selected, mode).map_err(failed)?;
    let paths = &ctx.config.paths;
    let target = EnvironmentTarget::new(&paths.config_root, &paths.shell_rc);

    if ctx.dry_run {
        if target
            .is_current(&patch, &*ctx.user_fs, &*ctx.clock)
            .map_err(failed)?
        {
            ctx.log.debug("shell environment already up to date");
        } else {
            ctx.log
                .dry_run(&format!("would update {}", target.script.display()));
        }
        return Ok(());
    }

    match target
        .apply(&patch, &*ctx.user_fs, &*ctx.clock)
        .map_err(failed)?
    {
        ResourceChange::Applied if patch.is_empty() => ctx.log.info(&format!(
            "removed {} and its source line",
            target.script.display()
        )),
        ResourceChange::Applied => ctx.log.info(&format!(
            "updated {}; open a new shell to pick it up",
            target.script.display()
        )),
        ResourceChange::AlreadyCorrect | ResourceChange::Skipped { .. } => {
            ctx.log.debug("shell environment already up to date");
        }
    }
    Ok(())
}

/// Environment variable naming the asset directory.
pub const ASSETS_ENV: &str = "POSTINSTALL_ASSETS";

/// Locate the asset directory.
///
/// Order: `--assets`, `[paths] assets`, `$POSTINSTALL_ASSETS`, next to the
/// executable (`../../../assets` from `target/release`, `../assets` from
/// `bin/`), then `./assets`.
///
/// # Errors
///
/// Returns an error if a named directory is missing or no candidate holds
/// the assets.
pub fn resolve_assets(explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    locate_assets(explicit, config, std::env::var_os(ASSETS_ENV))
}

fn locate_assets(
    explicit: Option<&Path>,
    config: &Config,
    from_env: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(path) = explicit.or(config.paths.assets.as_deref()) {
        return existing_dir(path);
    }

    if let Some(dir) = from_env.filter(|v| !v.is_empty()) {
        return existing_dir(Path::new(&dir))
            .with_context(|| format!("${ASSETS_ENV} points to a missing directory"));
    }

    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        candidates.push(parent.join("../../../assets"));
        candidates.push(parent.join("../assets"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("assets"));
    }
    for candidate in &candidates {
        if candidate.join(ASSET_MARKER).exists() {
            return std::fs::canonicalize(candidate)
                .with_context(|| format!("resolving {}", candidate.display()));
        }
    }

    anyhow::bail!("cannot find the asset directory. Use --assets or set {ASSETS_ENV}")
}

fn existing_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        anyhow::bail!("asset directory not found: {}", path.display());
    }
    Ok(path.to_path_buf())
}
