//! Uninstall command implementation.
use crate::components::{Component, Context, Requirements};
use crate::error::{IrreversibleOperationError, PostinstallError};
use crate::preflight::Preflight;

use super::Mode;

/// Refuse the whole run if any selected component cannot be undone.
///
/// # Errors
///
/// Returns the [`IrreversibleOperationError`] of the first such component.
pub fn ensure_reversible(components: &[Box<dyn Component>]) -> Result<(), IrreversibleOperationError> {
    for component in components {
        if let Some(reason) = component.irreversible_reason() {
            return Err(IrreversibleOperationError {
                component: component.name().to_string(),
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

/// Uninstall each component after the reversibility and requirement checks,
/// then update the shell environment.
///
/// # Errors
///
/// Returns [`PostinstallError::Irreversible`] or
/// [`PostinstallError::Preflight`] before any change, or
/// [`PostinstallError::Step`] for the first component that fails.
pub fn run(
    ctx: &Context,
    preflight: &dyn Preflight,
    components: &[Box<dyn Component>],
) -> Result<(), PostinstallError> {
    ensure_reversible(components)?;
    let requirements = components
        .iter()
        .fold(Requirements::NONE, |acc, c| acc | c.uninstall_requirements());
    super::check_requirements(ctx, preflight, requirements)?;
    super::run_components(ctx, components, Mode::Uninstall)?;
    super::update_environment(ctx, components, Mode::Uninstall)?;
    Ok(())
}
