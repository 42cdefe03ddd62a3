//! Domain-specific error types for the post-install driver.
//!
//! Internal modules return [`anyhow::Result`] with context; these typed errors
//! mark the failures the binary has to tell apart at the boundary (usage
//! output, exit code, summary line).
//!
//! # Error hierarchy
//!
//! ```text
//! PostinstallError
//! ├── Validation(ValidationError)             bad arguments, printed with usage
//! ├── Preflight(PreflightError)               missing privilege, network, disk
//! ├── Irreversible(IrreversibleOperationError) uninstall of a one-way component
//! └── Step(StepFailure)                       a component failed mid-run
//! ```

use thiserror::Error;

/// Top-level error type for a run.
#[derive(Error, Debug)]
pub enum PostinstallError {
    /// The command line could not be turned into a run.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A precondition of the selected components is not met.
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    /// A selected component cannot be uninstalled.
    #[error(transparent)]
    Irreversible(#[from] IrreversibleOperationError),

    /// A component failed while installing or uninstalling.
    #[error(transparent)]
    Step(#[from] StepFailure),
}

/// Errors in the command line itself.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A name matched no component or alias.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// `uninstall` appeared after the first positional argument.
    #[error("'uninstall' must be the first argument")]
    MisplacedUninstall,

    /// `uninstall` was given without any component.
    #[error("'uninstall' requires at least one component")]
    NothingToUninstall,

    /// Two options that cannot be combined.
    #[error("{0} cannot be combined with {1}")]
    ConflictingFlags(String, String),
}

/// A requirement that failed before anything was changed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreflightError {
    /// Neither running as root nor able to use sudo.
    #[error("administrative privileges are required (run as root or configure sudo)")]
    NoPrivilege,

    /// The connectivity check failed.
    #[error("network access is required but {url} is unreachable")]
    NoNetwork {
        /// URL that was probed.
        url: String,
    },

    /// Not enough free space on the checked filesystem.
    #[error("at least {required_mib} MiB free is required on {path}, found {available_mib} MiB")]
    InsufficientDiskSpace {
        /// Path whose filesystem was checked.
        path: String,
        /// Configured minimum.
        required_mib: u64,
        /// Space actually available.
        available_mib: u64,
    },

    /// Free space could not be determined.
    #[error("could not determine free space on {path}: {reason}")]
    DiskSpaceUnknown {
        /// Path whose filesystem was checked.
        path: String,
        /// Why the check failed.
        reason: String,
    },
}

/// Raised when uninstall is requested for a component that cannot be undone.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{component} cannot be uninstalled: {reason}")]
pub struct IrreversibleOperationError {
    /// Component name.
    pub component: String,
    /// What makes it irreversible.
    pub reason: String,
}

/// A component that failed; the run stops here.
#[derive(Error, Debug)]
#[error("{component} failed during {operation}: {source:#}")]
pub struct StepFailure {
    /// Component name.
    pub component: String,
    /// `install` or `uninstall`.
    pub operation: &'static str,
    /// Underlying error chain.
    pub source: anyhow::Error,
}

impl PostinstallError {
    /// Whether this error should be followed by the usage text.
    #[must_use]
    pub const fn shows_usage(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
