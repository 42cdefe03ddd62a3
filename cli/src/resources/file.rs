//! Managed files and directory trees with backup-before-overwrite.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::helpers::hash::{digest_bytes, digest_path};
use super::{Resource, ResourceChange, ResourceState};
use crate::backup::{BackupManager, Clock};
use crate::operations::FileSystemOps;

/// Where the desired content of a [`FileResource`] comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Bytes rendered in memory (generated configuration).
    Content(Vec<u8>),
    /// A file or directory tree shipped as an asset.
    Path(PathBuf),
}

/// A file or directory that should hold exactly the content of its source.
///
/// The target is up to date iff it exists and its SHA-256 digest equals the
/// source digest. Stale targets are backed up before being overwritten.
/// Removal restores the most recent backup over whatever the target holds,
/// and deletes the target when there is no backup. The restored backup is
/// kept, so removing again finds the target already restored.
#[derive(Debug)]
pub struct FileResource<'a> {
    source: FileSource,
    target: PathBuf,
    fs: &'a dyn FileSystemOps,
    backups: BackupManager<'a>,
    keep_without_backup: bool,
}

impl<'a> FileResource<'a> {
    /// Create a new file resource.
    #[must_use]
    pub fn new(
        source: FileSource,
        target: PathBuf,
        fs: &'a dyn FileSystemOps,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            source,
            target,
            fs,
            backups: BackupManager::new(fs, clock),
            keep_without_backup: false,
        }
    }

    /// File whose content is rendered in memory.
    #[must_use]
    pub fn content(
        content: impl Into<Vec<u8>>,
        target: PathBuf,
        fs: &'a dyn FileSystemOps,
        clock: &'a dyn Clock,
    ) -> Self {
        Self::new(FileSource::Content(content.into()), target, fs, clock)
    }

    /// File or directory copied from an asset on disk.
    #[must_use]
    pub fn copy_of(
        source: PathBuf,
        target: PathBuf,
        fs: &'a dyn FileSystemOps,
        clock: &'a dyn Clock,
    ) -> Self {
        Self::new(FileSource::Path(source), target, fs, clock)
    }

    /// On removal without a backup, leave the target in place instead of
    /// deleting it. Used for files the system owns (e.g. `/etc/default/grub`).
    #[must_use]
    pub const fn keep_without_backup(mut self) -> Self {
        self.keep_without_backup = true;
        self
    }

    /// Destination path.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Digest of the desired content, or `None` when the source asset is missing.
    fn source_digest(&self) -> Result<Option<String>> {
        match &self.source {
            FileSource::Content(bytes) => Ok(Some(digest_bytes(bytes))),
            FileSource::Path(path) if !self.fs.exists(path) => Ok(None),
            FileSource::Path(path) => digest_path(self.fs, path).map(Some),
        }
    }

    fn install(&self) -> Result<()> {
        match &self.source {
            FileSource::Content(bytes) => self.fs.write(&self.target, bytes),
            FileSource::Path(path) if !self.fs.exists(path) => Err(ResourceError::SourceNotFound {
                resource: path.display().to_string(),
            }
            .into()),
            FileSource::Path(path) => self.fs.copy(path, &self.target),
        }
    }
}

impl Resource for FileResource<'_> {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(wanted) = self.source_digest()? else {
            return Ok(ResourceState::Invalid {
                reason: match &self.source {
                    FileSource::Path(path) => format!("source {} is missing", path.display()),
                    FileSource::Content(_) => "source is missing".to_string(),
                },
            });
        };
        if !self.fs.exists(&self.target) {
            return Ok(ResourceState::Missing);
        }
        let current = digest_path(self.fs, &self.target)
            .with_context(|| format!("hashing {}", self.target.display()))?;
        if current == wanted {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing => {
                self.install()?;
                Ok(ResourceChange::Applied)
            }
            ResourceState::Incorrect { .. } => {
                self.backups.backup(&self.target)?;
                self.install()?;
                Ok(ResourceChange::Applied)
            }
        }
    }

    fn removable(&self, _state: &ResourceState) -> bool {
        self.fs.exists(&self.target)
            || self
                .backups
                .find_latest(&self.target)
                .is_ok_and(|record| record.is_some())
    }

    fn remove(&self) -> Result<ResourceChange> {
        if let Some(record) = self.backups.find_latest(&self.target)? {
            if self.backups.holds_current(&record)? {
                return Ok(ResourceChange::AlreadyCorrect);
            }
            self.backups.restore(&record)?;
            return Ok(ResourceChange::Applied);
        }
        if self.keep_without_backup {
            return Ok(ResourceChange::Skipped {
                reason: "no backup to restore".to_string(),
            });
        }
        if !self.fs.exists(&self.target) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.fs.remove(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}
