//! Alternate kernel made the default GRUB entry.
use anyhow::{Context as _, Result};

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, TaskStats};
use crate::resources::file::FileResource;
use crate::resources::package::PackageResource;
use crate::resources::{Resource, ResourceState};
use crate::system::bootloader::{default_entry, find_menu_entry, with_default_entry};

/// Alternate kernel, selected as the default boot entry.
#[derive(Debug, Clone, Copy)]
pub struct Kernel;

impl Kernel {
    fn package(ctx: &Context) -> PackageResource<'_> {
        PackageResource::new(ctx.config.kernel.package.clone(), &*ctx.packages)
    }

    fn defaults_text(ctx: &Context) -> Result<String> {
        let path = ctx.bootloader.defaults_path();
        let bytes = ctx
            .system_fs
            .read(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// `GRUB_DEFAULT` file pointing at `id`.
    ///
    /// The file predates us, so removal without a backup leaves it alone.
    fn defaults<'a>(ctx: &'a Context, id: &'a str) -> Result<FileResource<'a>> {
        let text = Self::defaults_text(ctx)?;
        Ok(FileResource::content(
            with_default_entry(&text, id),
            ctx.bootloader.defaults_path(),
            &*ctx.system_fs,
            &*ctx.clock,
        )
        .keep_without_backup())
    }

    fn menu_entry(ctx: &Context) -> Result<Option<String>> {
        let menu = ctx.bootloader.menu_config()?;
        Ok(find_menu_entry(&menu, &ctx.config.kernel.menu_pattern))
    }

    /// Regenerate the menu once for a freshly installed kernel that is not
    /// listed yet, then look its entry up again.
    fn regenerate_menu_entry(ctx: &Context) -> Result<String> {
        ctx.log.debug("kernel not in boot menu, regenerating");
        ctx.bootloader.regenerate()?;
        Self::menu_entry(ctx)?.with_context(|| {
            format!(
                "no boot menu entry matches '{}'",
                ctx.config.kernel.menu_pattern
            )
        })
    }
}

impl Component for Kernel {
    fn name(&self) -> &'static str {
        "kernel"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["alt-kernel", "zen"]
    }

    fn summary(&self) -> &'static str {
        "alternate kernel as the default boot entry"
    }

    fn requirements(&self) -> Requirements {
        Requirements::ALL
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        if Self::package(ctx).current_state()? != ResourceState::Correct {
            return Ok(false);
        }
        let Some(id) = Self::menu_entry(ctx)? else {
            return Ok(false);
        };
        Ok(default_entry(&Self::defaults_text(ctx)?).as_deref() == Some(id.as_str()))
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats =
            super::apply_resources(ctx, [Self::package(ctx)], &ProcessOpts::apply_all("install"))?;
        if ctx.dry_run && !ctx.packages.is_installed(&ctx.config.kernel.package)? {
            ctx.log.dry_run(&format!(
                "would boot {} by default",
                ctx.config.kernel.package
            ));
            stats.changed += 1;
            return Ok(stats.finish(ctx));
        }

        let id = match Self::menu_entry(ctx)? {
            Some(id) => id,
            None if ctx.dry_run => {
                ctx.log.dry_run(&format!(
                    "would regenerate the boot menu and boot {} by default",
                    ctx.config.kernel.package
                ));
                stats.changed += 1;
                return Ok(stats.finish(ctx));
            }
            None => Self::regenerate_menu_entry(ctx)?,
        };
        let defaults = Self::defaults(ctx, &id)?;
        let set = super::apply_resources(ctx, [&defaults], &ProcessOpts::apply_all("set"))?;
        if set.changed > 0 && !ctx.dry_run {
            ctx.bootloader.regenerate()?;
        }
        stats += set;
        Ok(stats.finish(ctx))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats = TaskStats::new();
        match Self::menu_entry(ctx)? {
            Some(id) => {
                stats += super::remove_resources(ctx, [Self::defaults(ctx, &id)?], "restore")?;
            }
            None => ctx.log.warn(&format!(
                "no boot menu entry matches '{}', leaving the default boot entry alone",
                ctx.config.kernel.menu_pattern
            )),
        }
        let restored = stats.changed > 0;
        stats += super::remove_resources(ctx, [Self::package(ctx)], "remove")?;
        if (restored || stats.changed > 0) && !ctx.dry_run {
            ctx.bootloader.regenerate()?;
        }
        Ok(stats.finish(ctx))
    }
}
