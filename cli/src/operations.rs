//! Filesystem operation abstractions for dependency injection.
//!
//! Every file-based target goes through [`FileSystemOps`]. Per-user paths use
//! [`SystemFileSystemOps`]; system-wide paths use [`SudoFileSystemOps`], which
//! reads directly but routes every mutation through `sudo`.

use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::exec::Executor;
use crate::resources::helpers::fs::copy_dir_recursive;

/// Abstraction over the filesystem operations used by resources and the
/// backup manager.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if anything (including a broken symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be read as a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Write `contents` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parents cannot be written.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Copy the file or directory tree at `from` to `to`, replacing whatever
    /// currently lives at `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove the file or directory tree at `path`. Missing paths are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Production [`FileSystemOps`] that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| e.map(|entry| entry.path()).map_err(Into::into))
            .collect()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        crate::resources::helpers::fs::ensure_parent_dir(path)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.remove(to)?;
        if from.is_dir() {
            copy_dir_recursive(from, to)
        } else {
            crate::resources::helpers::fs::ensure_parent_dir(to)?;
            std::fs::copy(from, to)
                .map(|_| ())
                .with_context(|| format!("copying {} to {}", from.display(), to.display()))
        }
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let Ok(meta) = std::fs::symlink_metadata(path) else {
            return Ok(());
        };
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
        .with_context(|| format!("removing {}", path.display()))
    }
}

/// [`FileSystemOps`] for system-wide paths owned by root.
///
/// Reads go straight to the filesystem (system configuration is world
/// readable); writes, copies, and removals run through `sudo`.
#[derive(Debug, Clone)]
pub struct SudoFileSystemOps {
    executor: Arc<dyn Executor>,
}

impl SudoFileSystemOps {
    /// Create a sudo-backed filesystem that issues commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn sudo(&self, args: &[&str]) -> Result<()> {
        self.executor.run("sudo", args).map(|_| ())
    }
}

impl FileSystemOps for SudoFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        SystemFileSystemOps.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        SystemFileSystemOps.is_dir(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        SystemFileSystemOps.read(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        SystemFileSystemOps.read_dir(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut staged = tempfile::NamedTempFile::new().context("creating staging file")?;
        staged
            .write_all(contents)
            .and_then(|()| staged.flush())
            .context("writing staging file")?;
        let staged_path = staged.path().to_string_lossy().into_owned();
        let target = path.to_string_lossy();
        self.sudo(&["install", "-D", "-m", "0644", &staged_path, &target])
            .with_context(|| format!("installing {}", path.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.remove(to)?;
        if let Some(parent) = to.parent() {
            self.sudo(&["mkdir", "-p", "--", &parent.to_string_lossy()])?;
        }
        self.sudo(&[
            "cp",
            "-aT",
            "--",
            &from.to_string_lossy(),
            &to.to_string_lossy(),
        ])
        .with_context(|| format!("copying {} to {}", from.display(), to.display()))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if !self.exists(path) {
            return Ok(());
        }
        self.sudo(&["rm", "-rf", "--", &path.to_string_lossy()])
            .with_context(|| format!("removing {}", path.display()))
    }
}
