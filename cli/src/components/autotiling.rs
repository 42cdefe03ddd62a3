//! Autotiling helper for sway.
use anyhow::Result;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::resources::Resource;
use crate::resources::file::FileResource;
use crate::resources::package::PackageResource;

const DROP_IN: &str = "# Managed by postinstall.\nexec_always autotiling\n";

/// Automatic split orientation for sway.
#[derive(Debug, Clone, Copy)]
pub struct Autotiling;

impl Autotiling {
    fn package(ctx: &Context) -> PackageResource<'_> {
        PackageResource::new(ctx.config.autotiling.package.clone(), &*ctx.packages)
    }

    fn drop_in(ctx: &Context) -> FileResource<'_> {
        FileResource::content(
            DROP_IN,
            ctx.config
                .window_manager
                .config_dir
                .join("config.d")
                .join("autotiling"),
            &*ctx.user_fs,
            &*ctx.clock,
        )
    }
}

impl Component for Autotiling {
    fn name(&self) -> &'static str {
        "autotiling"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["tiling"]
    }

    fn summary(&self) -> &'static str {
        "autotiling helper for sway"
    }

    fn requirements(&self) -> Requirements {
        Requirements::PRIVILEGED_NETWORK
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        let resources: [Box<dyn Resource + '_>; 2] =
            [Box::new(Self::package(ctx)), Box::new(Self::drop_in(ctx))];
        all_correct(resources)
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats =
            super::apply_resources(ctx, [Self::package(ctx)], &ProcessOpts::apply_all("install"))?;
        stats +=
            super::apply_resources(ctx, [Self::drop_in(ctx)], &ProcessOpts::apply_all("write"))?;
        Ok(stats.finish(ctx))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats = super::remove_resources(ctx, [Self::drop_in(ctx)], "remove")?;
        stats += super::remove_resources(ctx, [Self::package(ctx)], "remove")?;
        Ok(stats.finish(ctx))
    }
}
