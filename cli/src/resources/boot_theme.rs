//! Default Plymouth boot theme.
use anyhow::Result;

use super::error::ResourceError;
use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

const SET_DEFAULT_THEME: &str = "plymouth-set-default-theme";

/// The boot splash theme selected with `plymouth-set-default-theme`.
///
/// Changing it rebuilds the initramfs (`-R`), so both apply and remove are
/// slow and need root.
#[derive(Debug)]
pub struct DefaultThemeResource<'a> {
    theme: String,
    executor: &'a dyn Executor,
}

impl<'a> DefaultThemeResource<'a> {
    /// Create a new default-theme resource.
    #[must_use]
    pub fn new(theme: impl Into<String>, executor: &'a dyn Executor) -> Self {
        Self {
            theme: theme.into(),
            executor,
        }
    }

    fn set(&self, args: &[&str]) -> Result<()> {
        let mut full = vec![SET_DEFAULT_THEME, "-R"];
        full.extend_from_slice(args);
        let result = self.executor.run_unchecked("sudo", &full)?;
        if result.success {
            Ok(())
        } else {
            Err(ResourceError::ExecutionFailed {
                program: SET_DEFAULT_THEME.to_string(),
                exit_code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            }
            .into())
        }
    }
}

impl Resource for DefaultThemeResource<'_> {
    fn description(&self) -> String {
        format!("default boot theme {}", self.theme)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let result = self.executor.run_unchecked(SET_DEFAULT_THEME, &[])?;
        if !result.success {
            return Ok(ResourceState::Missing);
        }
        let current = result.stdout.trim();
        if current == self.theme {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: current.to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.set(&[&self.theme])?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        self.set(&["--reset"])?;
        Ok(ResourceChange::Applied)
    }
}
