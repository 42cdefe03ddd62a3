//! System service resource (enabled at boot and running).
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::system::services::ServiceManager;

/// A service that should be both enabled and active.
#[derive(Debug)]
pub struct ServiceResource<'a> {
    /// Unit name (e.g. `keyd`).
    pub unit: String,
    manager: &'a dyn ServiceManager,
}

impl<'a> ServiceResource<'a> {
    /// Create a new service resource.
    #[must_use]
    pub fn new(unit: impl Into<String>, manager: &'a dyn ServiceManager) -> Self {
        Self {
            unit: unit.into(),
            manager,
        }
    }
}

impl Resource for ServiceResource<'_> {
    fn description(&self) -> String {
        format!("{}.service", self.unit)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let enabled = self.manager.is_enabled(&self.unit)?;
        let active = self.manager.is_active(&self.unit)?;
        Ok(match (enabled, active) {
            (true, true) => ResourceState::Correct,
            (false, false) => ResourceState::Missing,
            (true, false) => ResourceState::Incorrect {
                current: "enabled, inactive".to_string(),
            },
            (false, true) => ResourceState::Incorrect {
                current: "active, disabled".to_string(),
            },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut changed = false;
        if !self.manager.is_enabled(&self.unit)? {
            self.manager.enable(&self.unit)?;
            changed = true;
        }
        if !self.manager.is_active(&self.unit)? {
            self.manager.start(&self.unit)?;
            changed = true;
        }
        Ok(if changed {
            ResourceChange::Applied
        } else {
            ResourceChange::AlreadyCorrect
        })
    }

    /// A half-configured service is still ours to stop.
    fn removable(&self, state: &ResourceState) -> bool {
        matches!(
            state,
            ResourceState::Correct | ResourceState::Incorrect { .. }
        )
    }

    fn remove(&self) -> Result<ResourceChange> {
        let mut changed = false;
        if self.manager.is_active(&self.unit)? {
            self.manager.stop(&self.unit)?;
            changed = true;
        }
        if self.manager.is_enabled(&self.unit)? {
            self.manager.disable(&self.unit)?;
            changed = true;
        }
        Ok(if changed {
            ResourceChange::Applied
        } else {
            ResourceChange::AlreadyCorrect
        })
    }
}
