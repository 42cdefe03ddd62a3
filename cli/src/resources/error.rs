//! Typed error variants for resource operations.
//!
//! Internal resource code may return these variants directly; callers convert
//! to [`anyhow::Error`] via `?`.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A command invoked by a resource failed with a non-zero exit code.
    #[error("command '{program}' failed (exit {exit_code}): {stderr}")]
    ExecutionFailed {
        /// Name of the program that was invoked.
        program: String,
        /// Exit code returned by the process.
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A required source (asset file or directory) was not found.
    #[error("source not found: {resource}")]
    SourceNotFound {
        /// Description of the missing source.
        resource: String,
    },

    /// The requested operation is not supported for this resource type.
    #[error("operation '{operation}' is not supported for resource '{resource}'")]
    UnsupportedOperation {
        /// Name of the unsupported operation (e.g. `"remove"`).
        operation: String,
        /// Name or description of the resource.
        resource: String,
    },
}
