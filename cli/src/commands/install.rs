//! Install command implementation.
use crate::components::{Component, Context, Requirements};
use crate::error::PostinstallError;
use crate::preflight::Preflight;

use super::Mode;

/// Check the combined requirements, install each component, then update the
/// shell environment.
///
/// # Errors
///
/// Returns [`PostinstallError::Preflight`] before any change, or
/// [`PostinstallError::Step`] for the first component that fails.
pub fn run(
    ctx: &Context,
    preflight: &dyn Preflight,
    components: &[Box<dyn Component>],
) -> Result<(), PostinstallError> {
    let requirements = components
        .iter()
        .fold(Requirements::NONE, |acc, c| acc | c.requirements());
    super::check_requirements(ctx, preflight, requirements)?;
    super::run_components(ctx, components, Mode::Install)?;
    super::update_environment(ctx, components, Mode::Install)?;
    Ok(())
}
