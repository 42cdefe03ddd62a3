//! SSH key pair generated once and never removed.
use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::helpers::fs::ensure_parent_dir;
use super::{Resource, ResourceChange, ResourceState};
use crate::error::IrreversibleOperationError;
use crate::exec::Executor;

/// An ed25519 key pair at `path` / `path.pub`.
#[derive(Debug)]
pub struct SshKeyResource<'a> {
    path: PathBuf,
    comment: String,
    executor: &'a dyn Executor,
}

impl<'a> SshKeyResource<'a> {
    /// Create a new SSH key resource.
    #[must_use]
    pub fn new(path: PathBuf, comment: impl Into<String>, executor: &'a dyn Executor) -> Self {
        Self {
            path,
            comment: comment.into(),
            executor,
        }
    }

    /// Path of the public half.
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".pub");
        PathBuf::from(name)
    }

    /// Private key path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for SshKeyResource<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let private = self.path.exists();
        let public = self.public_key_path().exists();
        Ok(match (private, public) {
            (true, true) => ResourceState::Correct,
            (false, false) => ResourceState::Missing,
            (true, false) => ResourceState::Invalid {
                reason: "private key exists without its public key".to_string(),
            },
            (false, true) => ResourceState::Invalid {
                reason: "public key exists without its private key".to_string(),
            },
        })
    }

    /// Generates the key only when neither half exists; an existing key is
    /// never overwritten.
    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => return Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }
        ensure_parent_dir(&self.path)?;
        let path = self.path.to_string_lossy();
        self.executor
            .run(
                "ssh-keygen",
                &[
                    "-q",
                    "-t",
                    "ed25519",
                    "-C",
                    &self.comment,
                    "-f",
                    &path,
                    "-N",
                    "",
                ],
            )
            .with_context(|| format!("generating {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        Err(IrreversibleOperationError {
            component: self.description(),
            reason: "deleting a key pair cannot be undone".to_string(),
        }
        .into())
    }
}
