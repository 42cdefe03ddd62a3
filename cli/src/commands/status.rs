//! Status command: report each component's probed state without changing
//! anything.
use crate::components::{Component, Context};
use crate::error::{PostinstallError, StepFailure};

/// Probed state of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentState {
    /// Component name.
    pub name: &'static str,
    /// Whether the component is fully installed.
    pub installed: bool,
}

/// Probe every component in `components`.
///
/// # Errors
///
/// Returns a [`StepFailure`] for the first component whose state cannot be
/// determined.
pub fn probe(
    ctx: &Context,
    components: &[Box<dyn Component>],
) -> Result<Vec<ComponentState>, StepFailure> {
    components
        .iter()
        .map(|component| {
            let installed = component.is_installed(ctx).map_err(|source| StepFailure {
                component: component.name().to_string(),
                operation: "status",
                source,
            })?;
            Ok(ComponentState {
                name: component.name(),
                installed,
            })
        })
        .collect()
}

/// Print one line per component.
///
/// # Errors
///
/// See [`probe`].
pub fn run(ctx: &Context, components: &[Box<dyn Component>]) -> Result<(), PostinstallError> {
    let states = probe(ctx, components)?;
    let width = states.iter().map(|s| s.name.len()).max().unwrap_or(0);
    ctx.log.stage("Component status");
    for state in &states {
        let label = if state.installed {
            "installed"
        } else {
            "not installed"
        };
        ctx.log.info(&format!("{:<width$}  {label}", state.name));
    }
    Ok(())
}
