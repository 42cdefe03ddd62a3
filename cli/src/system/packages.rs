//! Distribution package managers.
use anyhow::Result;
use std::sync::Arc;

use crate::exec::Executor;
use crate::platform::Family;

/// Query and mutate the system package database.
#[cfg_attr(test, mockall::automock)]
pub trait PackageManager: Send + Sync + std::fmt::Debug {
    /// Short name for log output (`apt`, `pacman`, `dnf`).
    fn name(&self) -> &'static str;

    /// Whether `package` is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the package database cannot be queried.
    fn is_installed(&self, package: &str) -> Result<bool>;

    /// Install `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if the install command fails.
    fn install(&self, package: &str) -> Result<()>;

    /// Remove `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal command fails.
    fn remove(&self, package: &str) -> Result<()>;
}

/// Select the package manager for a distribution family.
#[must_use]
pub fn for_family(family: Family, executor: Arc<dyn Executor>) -> Box<dyn PackageManager> {
    match family {
        Family::Debian => Box::new(Apt { executor }),
        Family::Arch => Box::new(Pacman { executor }),
        Family::Fedora => Box::new(Dnf { executor }),
    }
}

/// Debian family: `dpkg-query` + `apt-get`.
#[derive(Debug)]
pub struct Apt {
    executor: Arc<dyn Executor>,
}

impl PackageManager for Apt {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        let result = self
            .executor
            .run_unchecked("dpkg-query", &["-W", "-f=${Status}", package])?;
        Ok(result.success && result.stdout.contains("install ok installed"))
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["apt-get", "install", "-y", package])?;
        Ok(())
    }

    fn remove(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["apt-get", "remove", "-y", package])?;
        Ok(())
    }
}

/// Arch family: `pacman`.
#[derive(Debug)]
pub struct Pacman {
    executor: Arc<dyn Executor>,
}

impl PackageManager for Pacman {
    fn name(&self) -> &'static str {
        "pacman"
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.executor.run_unchecked("pacman", &["-Q", package])?.success)
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["pacman", "-S", "--needed", "--noconfirm", package])?;
        Ok(())
    }

    fn remove(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["pacman", "-Rns", "--noconfirm", package])?;
        Ok(())
    }
}

/// Fedora family: `rpm` + `dnf`.
#[derive(Debug)]
pub struct Dnf {
    executor: Arc<dyn Executor>,
}

impl PackageManager for Dnf {
    fn name(&self) -> &'static str {
        "dnf"
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.executor.run_unchecked("rpm", &["-q", package])?.success)
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor.run("sudo", &["dnf", "install", "-y", package])?;
        Ok(())
    }

    fn remove(&self, package: &str) -> Result<()> {
        self.executor.run("sudo", &["dnf", "remove", "-y", package])?;
        Ok(())
    }
}
