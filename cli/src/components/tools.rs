//! Command-line tools installed from the distribution repositories.
use anyhow::Result;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::environment::EnvironmentPatch;
use crate::resources::package::PackageResource;

/// Command-line tools from the distribution repositories.
#[derive(Debug, Clone, Copy)]
pub struct Tools;

impl Tools {
    fn resources(ctx: &Context) -> Vec<PackageResource<'_>> {
        ctx.config
            .tools
            .packages
            .iter()
            .map(|name| PackageResource::new(name.clone(), &*ctx.packages))
            .collect()
    }
}

impl Component for Tools {
    fn name(&self) -> &'static str {
        "tools"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cli-tools", "cli"]
    }

    fn summary(&self) -> &'static str {
        "command-line tools"
    }

    fn requirements(&self) -> Requirements {
        Requirements::PRIVILEGED_NETWORK
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        all_correct(Self::resources(ctx))
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.config.tools.packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages configured".to_string()));
        }
        super::process_resources(ctx, Self::resources(ctx), &ProcessOpts::apply_all("install"))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        super::process_resources_remove(ctx, Self::resources(ctx), "remove")
    }

    fn environment(&self, _ctx: &Context) -> EnvironmentPatch {
        EnvironmentPatch::default().prepend_path("$HOME/.local/bin")
    }
}
