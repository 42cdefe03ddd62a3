//! Independently selectable units of configuration and their ordered registry.
pub mod autotiling;
pub mod boot_theme;
pub mod context;
pub mod kernel;
pub mod keyboard;
mod processing;
pub mod prompt;
pub mod ssh_key;
pub mod tools;
pub mod window_manager;

pub use context::Context;
pub use processing::{
    ProcessOpts, TaskResult, TaskStats, apply_resources, process_resources,
    process_resources_remove, remove_resources,
};

use anyhow::Result;
use std::fmt::Write as _;
use std::ops::{BitOr, BitOrAssign};

use crate::environment::EnvironmentPatch;
use crate::error::ValidationError;
use crate::resources::{Resource, ResourceState};

/// Preconditions a component needs before it may run.
///
/// Requirements of every selected component are combined with `|` and checked
/// once, before anything is changed.
///
/// # Examples
///
/// ```
/// use postinstall_cli::components::Requirements;
///
/// let combined = Requirements::PRIVILEGED_NETWORK | Requirements::NONE;
/// assert!(combined.privilege && combined.network && !combined.disk_space);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Root or working `sudo`.
    pub privilege: bool,
    /// Package mirrors reachable.
    pub network: bool,
    /// Enough free space for large packages or boot images.
    pub disk_space: bool,
}

impl Requirements {
    /// Nothing required.
    pub const NONE: Self = Self {
        privilege: false,
        network: false,
        disk_space: false,
    };

    /// Root only.
    pub const PRIVILEGED: Self = Self {
        privilege: true,
        network: false,
        disk_space: false,
    };

    /// Root and network (package installs).
    pub const PRIVILEGED_NETWORK: Self = Self {
        privilege: true,
        network: true,
        disk_space: false,
    };

    /// Everything (kernel and boot image rebuilds).
    pub const ALL: Self = Self {
        privilege: true,
        network: true,
        disk_space: true,
    };

    /// Whether any check is needed.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.privilege || self.network || self.disk_space)
    }
}

impl BitOr for Requirements {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            privilege: self.privilege || rhs.privilege,
            network: self.network || rhs.network,
            disk_space: self.disk_space || rhs.disk_space,
        }
    }
}

impl BitOrAssign for Requirements {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// A named, independently selectable unit of configuration.
pub trait Component: Send + Sync {
    /// Canonical name used on the command line.
    fn name(&self) -> &'static str;

    /// Alternative names resolving to this component.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// One-line summary for the usage text.
    fn summary(&self) -> &'static str;

    /// Preconditions for [`install`](Self::install).
    fn requirements(&self) -> Requirements;

    /// Preconditions for [`uninstall`](Self::uninstall). Removal never
    /// downloads anything, so only privilege carries over by default.
    fn uninstall_requirements(&self) -> Requirements {
        Requirements {
            privilege: self.requirements().privilege,
            ..Requirements::NONE
        }
    }

    /// Why this component refuses uninstall, if it does.
    fn irreversible_reason(&self) -> Option<&'static str> {
        None
    }

    /// Whether [`uninstall`](Self::uninstall) is supported.
    fn reversible(&self) -> bool {
        self.irreversible_reason().is_none()
    }

    /// Whether every target of the component is in its desired state.
    /// Never changes anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a target cannot be probed.
    fn is_installed(&self, ctx: &Context) -> Result<bool>;

    /// Bring every target to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the run stops there.
    fn install(&self, ctx: &Context) -> Result<TaskResult>;

    /// Undo [`install`](Self::install), restoring backed-up state.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; the run stops there.
    fn uninstall(&self, ctx: &Context) -> Result<TaskResult>;

    /// Shell environment this component contributes while installed.
    fn environment(&self, _ctx: &Context) -> EnvironmentPatch {
        EnvironmentPatch::default()
    }

    /// Whether `name` selects this component (case-insensitive).
    fn matches(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
            || self.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Every component, in the fixed order they run in.
#[must_use]
pub fn registry() -> Vec<Box<dyn Component>> {
    vec![
        Box::new(tools::Tools),
        Box::new(boot_theme::BootTheme),
        Box::new(prompt::Prompt),
        Box::new(keyboard::Keyboard),
        Box::new(window_manager::WindowManager),
        Box::new(autotiling::Autotiling),
        Box::new(ssh_key::SshKey),
        Box::new(kernel::Kernel),
    ]
}

/// Resolve command-line names to components.
///
/// Aliases map to their component, duplicates collapse, and the result keeps
/// registry order regardless of argument order.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownComponent`] for the first name that
/// matches nothing.
pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<Box<dyn Component>>, ValidationError> {
    let registry = registry();
    let mut selected = vec![false; registry.len()];
    for name in names {
        let name = name.as_ref();
        let index = registry
            .iter()
            .position(|c| c.matches(name))
            .ok_or_else(|| ValidationError::UnknownComponent(name.to_string()))?;
        if let Some(slot) = selected.get_mut(index) {
            *slot = true;
        }
    }
    Ok(registry
        .into_iter()
        .zip(selected)
        .filter_map(|(component, keep)| keep.then_some(component))
        .collect())
}

/// Component listing shown after the usage text.
#[must_use]
pub fn usage_table() -> String {
    let registry = registry();
    let width = registry.iter().map(|c| c.name().len()).max().unwrap_or(0);
    let mut out = String::from("Components:\n");
    for component in &registry {
        let aliases = if component.aliases().is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", component.aliases().join(", "))
        };
        // write! to a String is infallible.
        writeln!(
            out,
            "  {:width$}  {}{aliases}",
            component.name(),
            component.summary()
        )
        .unwrap_or(());
    }
    out
}

/// Whether every resource is [`ResourceState::Correct`].
///
/// # Errors
///
/// Propagates the first probe error.
pub fn all_correct<R: Resource>(resources: impl IntoIterator<Item = R>) -> Result<bool> {
    for resource in resources {
        if resource.current_state()? != ResourceState::Correct {
            return Ok(false);
        }
    }
    Ok(true)
}
