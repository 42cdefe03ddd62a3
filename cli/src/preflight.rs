//! Checks that gate a run before anything is changed.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::components::Requirements;
use crate::config::PreflightSettings;
use crate::error::PreflightError;
use crate::exec::Executor;

/// Probes for the preconditions components may require.
#[cfg_attr(test, mockall::automock)]
pub trait Preflight: Send + Sync + std::fmt::Debug {
    /// Running as root, or sudo is usable.
    fn has_privilege(&self) -> bool;

    /// `url` answers an HTTP request.
    fn has_network(&self, url: &str) -> bool;

    /// Free space in MiB on the filesystem holding `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the free space cannot be determined.
    fn available_space_mib(&self, path: &Path) -> Result<u64>;
}

/// [`Preflight`] against the host system.
#[derive(Debug)]
pub struct SystemPreflight {
    executor: Arc<dyn Executor>,
    timeout: Duration,
}

impl SystemPreflight {
    /// Create a preflight prober that runs commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            timeout: Duration::from_secs(5),
        }
    }
}

impl Preflight for SystemPreflight {
    fn has_privilege(&self) -> bool {
        let is_root = self
            .executor
            .run_unchecked("id", &["-u"])
            .is_ok_and(|r| r.success && r.stdout.trim() == "0");
        // `sudo -v` may prompt once; the credential is cached for the run.
        is_root
            || self
                .executor
                .run_unchecked("sudo", &["-v"])
                .is_ok_and(|r| r.success)
    }

    fn has_network(&self, url: &str) -> bool {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        match agent.head(url).call() {
            Ok(_) | Err(ureq::Error::StatusCode(_)) => true,
            Err(e) => {
                tracing::debug!("connectivity check {url}: {e}");
                false
            }
        }
    }

    fn available_space_mib(&self, path: &Path) -> Result<u64> {
        let path_arg = path.to_string_lossy();
        let result = self.executor.run("df", &["-Pk", &path_arg])?;
        parse_df_available_kib(&result.stdout)
            .map(|kib| kib / 1024)
            .with_context(|| format!("unexpected df output: {}", result.stdout.trim()))
    }
}

/// Available KiB from POSIX `df -Pk` output (fourth column of the data row).
#[must_use]
pub fn parse_df_available_kib(output: &str) -> Option<u64> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .last()?
        .split_whitespace()
        .nth(3)?
        .parse()
        .ok()
}

/// Verify every requirement, in the order privilege, network, disk space.
///
/// # Errors
///
/// Returns the first unmet requirement.
pub fn check(
    preflight: &dyn Preflight,
    requirements: Requirements,
    settings: &PreflightSettings,
) -> Result<(), PreflightError> {
    if requirements.privilege && !preflight.has_privilege() {
        return Err(PreflightError::NoPrivilege);
    }
    if requirements.network && !preflight.has_network(&settings.connectivity_url) {
        return Err(PreflightError::NoNetwork {
            url: settings.connectivity_url.clone(),
        });
    }
    if requirements.disk_space {
        let path = settings.disk_path.display().to_string();
        let available_mib = preflight
            .available_space_mib(&settings.disk_path)
            .map_err(|e| PreflightError::DiskSpaceUnknown {
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;
        if available_mib < settings.min_free_mib {
            return Err(PreflightError::InsufficientDiskSpace {
                path,
                required_mib: settings.min_free_mib,
                available_mib,
            });
        }
    }
    Ok(())
}
