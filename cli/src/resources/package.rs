//! Package installation resource.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::system::packages::PackageManager;

/// A system package that can be checked, installed, and removed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    manager: &'a dyn PackageManager,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub fn new(name: impl Into<String>, manager: &'a dyn PackageManager) -> Self {
        Self {
            name: name.into(),
            manager,
        }
    }
}

impl Resource for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager.name())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.manager.is_installed(&self.name)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.manager.is_installed(&self.name)? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.manager.install(&self.name)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if !self.manager.is_installed(&self.name)? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.manager.remove(&self.name)?;
        Ok(ResourceChange::Applied)
    }
}
