//! Timestamped backups taken before every destructive write.
//!
//! A backup of `/etc/keyd/default.conf` taken at 2024-05-01 13:37:00 lives at
//! `/etc/keyd/default.conf.bak.20240501133700`. The fixed-width timestamp makes
//! lexicographic order of the suffix equal to chronological order, which is
//! how [`BackupManager::find_latest`] picks the most recent one.
//!
//! Backups are never pruned automatically.

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::operations::FileSystemOps;
use crate::resources::helpers::hash::digest_path;

/// `strftime` format of the backup suffix (second resolution, fixed width).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Separator between the original file name and the timestamp.
const BACKUP_MARKER: &str = ".bak.";

/// Width of a formatted [`TIMESTAMP_FORMAT`] value.
const TIMESTAMP_LEN: usize = 14;

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// [`Clock`] backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A single backup on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Path that was backed up.
    pub original_path: PathBuf,
    /// Where the copy lives (`original_path` + `.bak.` + timestamp).
    pub backup_path: PathBuf,
    /// When the backup was taken.
    pub created_at: NaiveDateTime,
}

/// Errors specific to backup bookkeeping.
#[derive(Error, Debug)]
pub enum BackupError {
    /// A backup with the same timestamp already exists.
    ///
    /// Two destructive writes to the same path within one second would map to
    /// the same backup name; the earlier backup is kept and the write refused.
    #[error("backup {} already exists; refusing to overwrite it", path.display())]
    Collision {
        /// The existing backup path.
        path: PathBuf,
    },

    /// The path has no file name to derive a backup name from.
    #[error("cannot back up {}: path has no file name", path.display())]
    NoFileName {
        /// Offending path.
        path: PathBuf,
    },
}

/// Creates, finds, and restores backups through a [`FileSystemOps`].
#[derive(Debug, Clone, Copy)]
pub struct BackupManager<'a> {
    fs: &'a dyn FileSystemOps,
    clock: &'a dyn Clock,
}

impl<'a> BackupManager<'a> {
    /// Create a backup manager operating on `fs`, timestamping with `clock`.
    #[must_use]
    pub const fn new(fs: &'a dyn FileSystemOps, clock: &'a dyn Clock) -> Self {
        Self { fs, clock }
    }

    /// Backup path for `path` taken at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NoFileName`] if `path` has no file name.
    pub fn backup_path_for(path: &Path, at: NaiveDateTime) -> Result<PathBuf, BackupError> {
        let Some(name) = path.file_name() else {
            return Err(BackupError::NoFileName {
                path: path.to_path_buf(),
            });
        };
        let mut backup_name = OsString::from(name);
        backup_name.push(BACKUP_MARKER);
        backup_name.push(at.format(TIMESTAMP_FORMAT).to_string());
        Ok(path.with_file_name(backup_name))
    }

    /// Copy the current state of `path` to a new timestamped backup.
    ///
    /// Returns `None` when `path` does not exist: backing up nothing is not
    /// an error. When the latest backup already holds the current content it
    /// is returned instead of taking another one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup name collides with an existing backup
    /// or the copy fails.
    pub fn backup(&self, path: &Path) -> Result<Option<BackupRecord>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        if let Some(latest) = self.find_latest(path)?
            && self.holds_current(&latest)?
        {
            tracing::debug!(
                "backup: {} unchanged since {}",
                path.display(),
                latest.backup_path.display()
            );
            return Ok(Some(latest));
        }
        let created_at = self.clock.now();
        let backup_path = Self::backup_path_for(path, created_at)?;
        if self.fs.exists(&backup_path) {
            return Err(BackupError::Collision { path: backup_path }.into());
        }
        self.fs
            .copy(path, &backup_path)
            .with_context(|| format!("backing up {}", path.display()))?;
        tracing::debug!("backup: {} -> {}", path.display(), backup_path.display());
        Ok(Some(BackupRecord {
            original_path: path.to_path_buf(),
            backup_path,
            created_at,
        }))
    }

    /// All backups of `path`, oldest first.
    ///
    /// Siblings whose suffix is not a well-formed timestamp are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory exists but cannot be listed.
    pub fn list(&self, path: &Path) -> Result<Vec<BackupRecord>> {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(Vec::new());
        };
        if !self.fs.is_dir(parent) {
            return Ok(Vec::new());
        }
        let prefix = format!("{}{BACKUP_MARKER}", name.to_string_lossy());

        let mut records: Vec<BackupRecord> = self
            .fs
            .read_dir(parent)?
            .into_iter()
            .filter_map(|candidate| {
                let file_name = candidate.file_name()?.to_str()?.to_owned();
                let stamp = file_name.strip_prefix(&prefix)?;
                let created_at = parse_timestamp(stamp)?;
                Some(BackupRecord {
                    original_path: path.to_path_buf(),
                    backup_path: candidate,
                    created_at,
                })
            })
            .collect();
        records.sort_by(|a, b| a.backup_path.cmp(&b.backup_path));
        Ok(records)
    }

    /// The most recent backup of `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backups cannot be listed.
    pub fn find_latest(&self, path: &Path) -> Result<Option<BackupRecord>> {
        Ok(self.list(path)?.pop())
    }

    /// Copy the backup content back onto the original path, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    pub fn restore(&self, record: &BackupRecord) -> Result<()> {
        self.fs
            .copy(&record.backup_path, &record.original_path)
            .with_context(|| {
                format!(
                    "restoring {} from {}",
                    record.original_path.display(),
                    record.backup_path.display()
                )
            })
    }

    /// Whether `record` holds exactly what its original path holds now.
    ///
    /// # Errors
    ///
    /// Returns an error if either side cannot be read.
    pub fn holds_current(&self, record: &BackupRecord) -> Result<bool> {
        if !self.fs.exists(&record.original_path) {
            return Ok(false);
        }
        Ok(digest_path(self.fs, &record.backup_path)?
            == digest_path(self.fs, &record.original_path)?)
    }
}

fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    if stamp.len() != TIMESTAMP_LEN || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Shared test doubles for code that takes backups.
#[cfg(test)]
pub mod test_helpers {
    use super::Clock;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use std::sync::Mutex;

    /// A clock that starts at a fixed instant and advances one second per call,
    /// so successive backups never collide.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<NaiveDateTime>,
    }

    impl SteppingClock {
        /// Start at 2024-05-01 12:00:00.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn new() -> Self {
            let start = NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .expect("valid fixed date");
            Self::starting_at(start)
        }

        /// Start at `start`.
        #[must_use]
        pub const fn starting_at(start: NaiveDateTime) -> Self {
            Self {
                next: Mutex::new(start),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> NaiveDateTime {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = *next;
            *next = now + TimeDelta::seconds(1);
            now
        }
    }

    /// A clock frozen at one instant.
    #[derive(Debug)]
    pub struct FrozenClock(pub NaiveDateTime);

    impl Clock for FrozenClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }
}
