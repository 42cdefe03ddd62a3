//! A single line that must be present in a user-owned text file.
use anyhow::Result;
use std::path::PathBuf;

use super::{Resource, ResourceChange, ResourceState};
use crate::backup::{BackupManager, Clock};
use crate::operations::FileSystemOps;

/// Ensures `line` appears exactly once in `target` (typically a shell rc file).
///
/// The rest of the file belongs to the user, so the file is backed up before
/// every rewrite and removal only strips the line instead of restoring an old
/// copy over later edits.
#[derive(Debug)]
pub struct LineResource<'a> {
    line: String,
    target: PathBuf,
    fs: &'a dyn FileSystemOps,
    backups: BackupManager<'a>,
}

impl<'a> LineResource<'a> {
    /// Create a new line resource.
    #[must_use]
    pub fn new(
        line: impl Into<String>,
        target: PathBuf,
        fs: &'a dyn FileSystemOps,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            line: line.into(),
            target,
            fs,
            backups: BackupManager::new(fs, clock),
        }
    }

    fn read_target(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.fs.read(&self.target)?).into_owned())
    }

    fn contains_line(&self, text: &str) -> bool {
        text.lines().any(|l| l.trim_end() == self.line)
    }
}

impl Resource for LineResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.target.display(), self.line)
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.fs.exists(&self.target) {
            return Ok(ResourceState::Missing);
        }
        if self.contains_line(&self.read_target()?) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "line absent".to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut text = if self.fs.exists(&self.target) {
            self.read_target()?
        } else {
            String::new()
        };
        if self.contains_line(&text) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.backups.backup(&self.target)?;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.line);
        text.push('\n');
        self.fs.write(&self.target, text.as_bytes())?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        let text = self.read_target()?;
        if !self.contains_line(&text) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.backups.backup(&self.target)?;
        let mut kept: String = text
            .lines()
            .filter(|l| l.trim_end() != self.line)
            .collect::<Vec<_>>()
            .join("\n");
        if !kept.is_empty() {
            kept.push('\n');
        }
        self.fs.write(&self.target, kept.as_bytes())?;
        Ok(ResourceChange::Applied)
    }
}
