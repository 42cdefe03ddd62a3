//! Starship prompt and its configuration.
use anyhow::Result;

use super::{Component, Context, ProcessOpts, Requirements, TaskResult, all_correct};
use crate::environment::EnvironmentPatch;
use crate::resources::Resource;
use crate::resources::file::FileResource;
use crate::resources::package::PackageResource;

/// Starship shell prompt.
#[derive(Debug, Clone, Copy)]
pub struct Prompt;

impl Prompt {
    fn config_path(ctx: &Context) -> std::path::PathBuf {
        ctx.config.paths.config_root.join("starship.toml")
    }

    fn config(ctx: &Context) -> FileResource<'_> {
        FileResource::copy_of(
            ctx.asset("starship/starship.toml"),
            Self::config_path(ctx),
            &*ctx.user_fs,
            &*ctx.clock,
        )
    }

    fn package(ctx: &Context) -> PackageResource<'_> {
        PackageResource::new(ctx.config.prompt.package.clone(), &*ctx.packages)
    }
}

impl Component for Prompt {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["starship"]
    }

    fn summary(&self) -> &'static str {
        "Starship shell prompt"
    }

    fn requirements(&self) -> Requirements {
        Requirements::PRIVILEGED_NETWORK
    }

    /// The package stays; only the configuration is ours to take back.
    fn uninstall_requirements(&self) -> Requirements {
        Requirements::NONE
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        let resources: [Box<dyn Resource + '_>; 2] =
            [Box::new(Self::package(ctx)), Box::new(Self::config(ctx))];
        all_correct(resources)
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats =
            super::apply_resources(ctx, [Self::package(ctx)], &ProcessOpts::apply_all("install"))?;
        stats += super::apply_resources(ctx, [Self::config(ctx)], &ProcessOpts::apply_all("write"))?;
        Ok(stats.finish(ctx))
    }

    fn uninstall(&self, ctx: &Context) -> Result<TaskResult> {
        super::process_resources_remove(ctx, [Self::config(ctx)], "restore")
    }

    fn environment(&self, ctx: &Context) -> EnvironmentPatch {
        EnvironmentPatch::default()
            .export(
                "STARSHIP_CONFIG",
                Self::config_path(ctx).display().to_string(),
            )
            .init_line("eval \"$(starship init bash)\"")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::test_helpers::TestContext;

    fn with_starship() -> TestContext {
        let mut test = TestContext::new();
        test.packages.expect_is_installed().returning(|_| Ok(true));
        test
    }

    #[test]
    fn writes_config_once() {
        let (ctx, root) = with_starship().build();
        assert!(!Prompt.is_installed(&ctx).unwrap());

        assert_eq!(Prompt.install(&ctx).unwrap(), TaskResult::Ok);
        assert!(Prompt.is_installed(&ctx).unwrap());
        assert!(matches!(
            Prompt.install(&ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
        assert_eq!(
            std::fs::read_to_string(root.path().join("config/starship.toml")).unwrap(),
            "add_newline = false\n"
        );
    }

    #[test]
    fn uninstall_restores_previous_config() {
        let (ctx, root) = with_starship().build();
        let target = root.path().join("config/starship.toml");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "format = \"$all\"\n").unwrap();

        Prompt.install(&ctx).unwrap();
        Prompt.uninstall(&ctx).unwrap();

        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "format = \"$all\"\n"
        );
    }

    #[test]
    fn edited_config_is_deleted_on_uninstall() {
        let (ctx, root) = with_starship().build();
        let target = root.path().join("config/starship.toml");
        Prompt.install(&ctx).unwrap();
        std::fs::write(&target, "# mine now\n").unwrap();

        assert_eq!(Prompt.uninstall(&ctx).unwrap(), TaskResult::Ok);

        assert!(!target.exists());
    }

    #[test]
    fn environment_points_at_installed_config() {
        let (ctx, root) = with_starship().build();
        let patch = Prompt.environment(&ctx);
        assert_eq!(
            patch.variables.get("STARSHIP_CONFIG"),
            Some(&root.path().join("config/starship.toml").display().to_string())
        );
        assert_eq!(patch.shell_init, vec!["eval \"$(starship init bash)\"".to_string()]);
    }
}
