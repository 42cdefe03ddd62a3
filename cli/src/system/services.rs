//! System service manager.
use anyhow::Result;
use std::sync::Arc;

use crate::exec::Executor;

/// Query and control system services.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceManager: Send + Sync + std::fmt::Debug {
    /// Whether `unit` starts at boot.
    ///
    /// # Errors
    ///
    /// Returns an error if the service manager cannot be queried.
    fn is_enabled(&self, unit: &str) -> Result<bool>;

    /// Whether `unit` is currently running.
    ///
    /// # Errors
    ///
    /// Returns an error if the service manager cannot be queried.
    fn is_active(&self, unit: &str) -> Result<bool>;

    /// Enable `unit` at boot.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn enable(&self, unit: &str) -> Result<()>;

    /// Start `unit` now.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn start(&self, unit: &str) -> Result<()>;

    /// Stop `unit` now.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn stop(&self, unit: &str) -> Result<()>;

    /// Disable `unit` at boot.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    fn disable(&self, unit: &str) -> Result<()>;
}

/// `systemctl` in system scope; mutations go through `sudo`.
#[derive(Debug)]
pub struct Systemctl {
    executor: Arc<dyn Executor>,
}

impl Systemctl {
    /// Create a systemctl wrapper issuing commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn query(&self, verb: &str, unit: &str) -> Result<bool> {
        Ok(self
            .executor
            .run_unchecked("systemctl", &[verb, "--quiet", unit])?
            .success)
    }

    fn control(&self, verb: &str, unit: &str) -> Result<()> {
        self.executor.run("sudo", &["systemctl", verb, unit])?;
        Ok(())
    }
}

impl ServiceManager for Systemctl {
    fn is_enabled(&self, unit: &str) -> Result<bool> {
        self.query("is-enabled", unit)
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        self.query("is-active", unit)
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.control("enable", unit)
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.control("start", unit)
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.control("stop", unit)
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.control("disable", unit)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn queries_use_quiet_systemctl() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, String::new()),
            (false, String::new()),
        ]));
        let systemctl = Systemctl::new(executor.clone());
        assert!(systemctl.is_enabled("keyd").unwrap());
        assert!(!systemctl.is_active("keyd").unwrap());
        assert_eq!(
            executor.calls(),
            vec![
                "systemctl is-enabled --quiet keyd".to_string(),
                "systemctl is-active --quiet keyd".to_string(),
            ]
        );
    }

    #[test]
    fn control_goes_through_sudo() {
        let executor = Arc::new(MockExecutor::ok(""));
        let systemctl = Systemctl::new(executor.clone());
        systemctl.enable("keyd").unwrap();
        assert_eq!(executor.calls(), vec!["sudo systemctl enable keyd".to_string()]);
    }

    #[test]
    fn control_failure_is_error() {
        let systemctl = Systemctl::new(Arc::new(MockExecutor::fail()));
        assert!(systemctl.start("keyd").is_err());
    }
}
