//! Plymouth boot splash theme.
//!
//! Backups of a replaced theme directory sit next to it under the theme
//! root, like every other backup.
use anyhow::Result;
use std::path::PathBuf;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::resources::Resource;
use crate::resources::boot_theme::DefaultThemeResource;
use crate::resources::file::FileResource;
use crate::resources::package::PackageResource;

/// Plymouth boot splash with a theme shipped in the assets.
#[derive(Debug, Clone, Copy)]
pub struct BootTheme;

impl BootTheme {
    fn theme_dir(ctx: &Context) -> FileResource<'_> {
        let theme = &ctx.config.boot_theme.theme;
        FileResource::copy_of(
            ctx.asset(PathBuf::from("plymouth").join(theme)),
            ctx.config.paths.theme_root.join(theme),
            &*ctx.system_fs,
            &*ctx.clock,
        )
    }

    fn default_theme(ctx: &Context) -> DefaultThemeResource<'_> {
        DefaultThemeResource::new(ctx.config.boot_theme.theme.clone(), &*ctx.executor)
    }

    fn package(ctx: &Context) -> PackageResource<'_> {
        PackageResource::new(ctx.config.boot_theme.package.clone(), &*ctx.packages)
    }
}

impl Component for BootTheme {
    fn name(&self) -> &'static str {
        "boot-theme"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["plymouth", "theme"]
    }

    fn summary(&self) -> &'static str {
        "Plymouth boot splash theme"
    }

    fn requirements(&self) -> Requirements {
        Requirements::ALL
    }

    /// Resetting the theme rebuilds the boot image as well.
    fn uninstall_requirements(&self) -> Requirements {
        Requirements {
            network: false,
            ..Requirements::ALL
        }
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        let resources: [Box<dyn Resource + '_>; 3] = [
            Box::new(Self::package(ctx)),
            Box::new(Self::theme_dir(ctx)),
            Box::new(Self::default_theme(ctx)),
        ];
        all_correct(resources)
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let opts = ProcessOpts::apply_all("install");
        // Without the package there is no `plymouth-set-default-theme` to query.
        let mut stats = super::apply_resources(ctx, [Self::package(ctx)], &opts)?;
        stats += super::apply_resources(ctx, [Self::theme_dir(ctx)], &opts)?;
        if ctx.dry_run && !ctx.packages.is_installed(&ctx.config.boot_theme.package)? {
            ctx.log.dry_run(&format!(
                "would set default boot theme {} and rebuild the boot image",
                ctx.config.boot_theme.theme
            ));
            stats.changed += 1;
        } else {
            stats += super::apply_resources(
                ctx,
                [Self::default_theme(ctx)],
                &ProcessOpts::apply_all("set"),
            )?;
        }
        Ok(stats.finish(ctx))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats = super::TaskStats::new();
        if ctx.packages.is_installed(&ctx.config.boot_theme.package)? {
            stats += super::remove_resources(ctx, [Self::default_theme(ctx)], "reset")?;
        }
        stats += super::remove_resources(ctx, [Self::theme_dir(ctx)], "remove")?;
        Ok(stats.finish(ctx))
    }
}
