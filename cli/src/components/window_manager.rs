//! Sway configuration.
use anyhow::Result;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::resources::file::FileResource;

/// Sway configuration.
#[derive(Debug, Clone, Copy)]
pub struct WindowManager;

impl WindowManager {
    fn config(ctx: &Context) -> FileResource<'_> {
        FileResource::copy_of(
            ctx.asset("sway/config"),
            ctx.config.window_manager.config_dir.join("config"),
            &*ctx.user_fs,
            &*ctx.clock,
        )
    }
}

impl Component for WindowManager {
    fn name(&self) -> &'static str {
        "window-manager"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["wm", "sway"]
    }

    fn summary(&self) -> &'static str {
        "sway window manager configuration"
    }

    fn requirements(&self) -> Requirements {
        Requirements::NONE
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        all_correct([Self::config(ctx)])
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        super::process_resources(ctx, [Self::config(ctx)], &ProcessOpts::apply_all("write"))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        super::process_resources_remove(ctx, [Self::config(ctx)], "restore")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::test_helpers::TestContext;

    fn backups(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with("config.bak.")
            })
            .count()
    }

    #[test]
    fn install_replaces_stale_config_with_one_backup() {
        let (ctx, root) = TestContext::new().build();
        let dir = root.path().join("config/sway");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config"), "OLD\n").unwrap();

        WindowManager.install(&ctx).unwrap();
        WindowManager.install(&ctx).unwrap();

        assert_eq!(backups(&dir), 1);
        assert!(WindowManager.is_installed(&ctx).unwrap());

        WindowManager.uninstall(&ctx).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("config")).unwrap(), "OLD\n");
        assert_eq!(backups(&dir), 1);
    }

    #[test]
    fn missing_asset_is_reported_not_written() {
        let (ctx, root) = TestContext::new().build();
        std::fs::remove_file(root.path().join("assets/sway/config")).unwrap();

        let result = WindowManager.install(&ctx).unwrap();

        assert!(matches!(result, TaskResult::Skipped(_)));
        assert!(!root.path().join("config/sway/config").exists());
    }

    #[test]
    fn needs_no_preflight() {
        assert!(WindowManager.requirements().is_empty());
        assert!(WindowManager.uninstall_requirements().is_empty());
    }
}
