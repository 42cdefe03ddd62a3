//! SSH key generation.
//!
//! The only component that refuses uninstall: deleting a key pair cannot be
//! undone.
use anyhow::{Context as _, Result};

use super::{Component, Context, ProcessOpts, Requirements, TaskResult};
use crate::error::IrreversibleOperationError;
use crate::resources::ssh_key::SshKeyResource;
use crate::resources::{Resource, ResourceState};

/// An ed25519 key pair for Git hosting.
///
/// Generated once and never removed: deleting key material cannot be undone.
#[derive(Debug, Clone, Copy)]
pub struct SshKey;

impl SshKey {
    fn key(ctx: &Context) -> SshKeyResource<'_> {
        SshKeyResource::new(
            ctx.config.ssh.key_path.clone(),
            ctx.config.ssh.comment.clone(),
            &*ctx.executor,
        )
    }
}

impl Component for SshKey {
    fn name(&self) -> &'static str {
        "ssh-key"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ssh"]
    }

    fn summary(&self) -> &'static str {
        "ed25519 SSH key pair"
    }

    fn requirements(&self) -> Requirements {
        Requirements::NONE
    }

    fn irreversible_reason(&self) -> Option<&'static str> {
        Some("deleting a key pair cannot be undone")
    }

    fn is_installed(&self, ctx: &Context) -> Result<bool> {
        Ok(Self::key(ctx).current_state()? == ResourceState::Correct)
    }

    fn install(&self, ctx: &Context) -> Result<TaskResult> {
        let key = Self::key(ctx);
        let stats = super::apply_resources(ctx, [&key], &ProcessOpts::apply_all("generate"))?;
        if !ctx.dry_run {
            if let ResourceState::Invalid { reason } = key.current_state()? {
                anyhow::bail!("{}: {reason}", key.path().display());
            }
            let public = key.public_key_path();
            let text = ctx
                .user_fs
                .read(&public)
                .with_context(|| format!("reading {}", public.display()))?;
            ctx.log.info("add this public key to your Git hosting account:");
            ctx.log.info(String::from_utf8_lossy(&text).trim());
        }
        Ok(stats.finish(ctx))
    }

    fn uninstall(&self, _ctx: &Context) -> Result<TaskResult> {
        Err(IrreversibleOperationError {
            component: self.name().to_string(),
            reason: self.irreversible_reason().unwrap_or_default().to_string(),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::components::test_helpers::TestContext;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn existing_key_is_kept_and_printed() {
        let mut test = TestContext::new();
        test.executor = MockExecutor::with_responses(vec![]);
        let (ctx, root) = test.build();
        let key = root.path().join(".ssh/id_ed25519");
        std::fs::create_dir_all(key.parent().unwrap()).unwrap();
        std::fs::write(&key, "PRIVATE").unwrap();
        std::fs::write(root.path().join(".ssh/id_ed25519.pub"), "ssh-ed25519 AAAA dev@host\n")
            .unwrap();

        assert!(SshKey.is_installed(&ctx).unwrap());
        assert!(matches!(SshKey.install(&ctx).unwrap(), TaskResult::Skipped(_)));
        assert_eq!(std::fs::read_to_string(&key).unwrap(), "PRIVATE");
    }

    #[test]
    fn missing_key_is_generated_with_configured_comment() {
        let mut test = TestContext::new();
        test.config.ssh.comment = "me@laptop".to_string();
        test.executor = MockExecutor::ok("");
        let (ctx, root) = test.build();
        let ssh = root.path().join(".ssh");
        assert!(!SshKey.is_installed(&ctx).unwrap());
        let stats = crate::components::apply_resources(
            &ctx,
            [SshKey::key(&ctx)],
            &ProcessOpts::apply_all("generate"),
        )
        .unwrap();
        assert_eq!(stats.changed, 1);
        // ssh-keygen is mocked; lay the pair down as it would.
        std::fs::write(ssh.join("id_ed25519"), "PRIVATE").unwrap();
        std::fs::write(ssh.join("id_ed25519.pub"), "ssh-ed25519 AAAA me@laptop\n").unwrap();
        assert!(SshKey.is_installed(&ctx).unwrap());
        assert!(matches!(SshKey.install(&ctx).unwrap(), TaskResult::Skipped(_)));
    }

    #[test]
    fn uninstall_is_refused_and_keeps_key() {
        let (ctx, root) = TestContext::new().build();
        let key = root.path().join(".ssh/id_ed25519");
        std::fs::create_dir_all(key.parent().unwrap()).unwrap();
        std::fs::write(&key, "PRIVATE").unwrap();

        let err = SshKey.uninstall(&ctx).unwrap_err();

        let refused = err.downcast_ref::<IrreversibleOperationError>().unwrap();
        assert_eq!(refused.component, "ssh-key");
        assert!(key.exists());
        assert!(!SshKey.reversible());
    }

    #[test]
    fn half_key_pair_fails_instead_of_overwriting() {
        let (ctx, root) = TestContext::new().build();
        let key = root.path().join(".ssh/id_ed25519");
        std::fs::create_dir_all(key.parent().unwrap()).unwrap();
        std::fs::write(&key, "PRIVATE").unwrap();

        let err = SshKey.install(&ctx).unwrap_err();

        assert!(err.to_string().contains("without its public key"));
        assert_eq!(std::fs::read_to_string(&key).unwrap(), "PRIVATE");
    }
}
