//! keyd keyboard remapping service.
use anyhow::Result;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::resources::Resource;
use crate::resources::file::FileResource;
use crate::resources::package::PackageResource;
use crate::resources::service::ServiceResource;

/// Key remapping through the keyd daemon.
#[derive(Debug, Clone, Copy)]
pub struct Keyboard;

impl Keyboard {
    fn package(ctx: &Context) -> PackageResource<'_> {
        PackageResource::new(ctx.config.keyboard.package.clone(), &*ctx.packages)
    }

    fn config(ctx: &Context) -> FileResource<'_> {
        FileResource::copy_of(
            ctx.asset("keyd/default.conf"),
            ctx.config.keyboard.config_path.clone(),
            &*ctx.system_fs,
            &*ctx.clock,
        )
    }

    fn service(ctx: &Context) -> ServiceResource<'_> {
        ServiceResource::new(ctx.config.keyboard.service.clone(), &*ctx.services)
    }
}

impl Component for Keyboard {
    fn name(&self) -> &'static str {
        "keyboard"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["keyd", "remap"]
    }

    fn summary(&self) -> &'static str {
        "keyd key remapping"
    }

    fn requirements(&self) -> Requirements {
        Requirements::PRIVILEGED_NETWORK
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        if !ctx.packages.is_installed(&ctx.config.keyboard.package)? {
            return Ok(false);
        }
        let resources: [Box<dyn Resource + '_>; 2] =
            [Box::new(Self::config(ctx)), Box::new(Self::service(ctx))];
        all_correct(resources)
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats =
            super::apply_resources(ctx, [Self::package(ctx)], &ProcessOpts::apply_all("install"))?;
        stats += super::apply_resources(ctx, [Self::config(ctx)], &ProcessOpts::apply_all("write"))?;
        if ctx.dry_run && !ctx.packages.is_installed(&ctx.config.keyboard.package)? {
            // The unit does not exist until the package is installed.
            ctx.log.dry_run(&format!(
                "would enable and start {}.service",
                ctx.config.keyboard.service
            ));
            stats.changed += 1;
        } else {
            stats += super::apply_resources(
                ctx,
                [Self::service(ctx)],
                &ProcessOpts::apply_all("enable"),
            )?;
        }
        Ok(stats.finish(ctx))
    }

    /// Stops the daemon before its configuration goes away.
    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.packages.is_installed(&ctx.config.keyboard.package)? {
            return super::process_resources_remove(ctx, [Self::config(ctx)], "restore");
        }
        let mut stats = super::remove_resources(ctx, [Self::service(ctx)], "stop")?;
        stats += super::remove_resources(ctx, [Self::config(ctx)], "restore")?;
        stats += super::remove_resources(ctx, [Self::package(ctx)], "remove")?;
        Ok(stats.finish(ctx))
    }
}
