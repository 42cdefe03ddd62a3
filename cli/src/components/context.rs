//! Everything a component needs to probe and change the host.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backup::{Clock, SystemClock};
use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SudoFileSystemOps, SystemFileSystemOps};
use crate::platform::Platform;
use crate::system::bootloader::{BootloaderConfig, Grub};
use crate::system::packages::{self, PackageManager};
use crate::system::services::{ServiceManager, Systemctl};

/// Shared context for component execution.
///
/// Every collaborator that touches the host is behind a trait object so
/// components can run against fakes.
pub struct Context {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and component recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Directory holding the shipped configuration assets.
    pub assets: PathBuf,
    /// Command executor.
    pub executor: Arc<dyn Executor>,
    /// Filesystem access for per-user paths.
    pub user_fs: Arc<dyn FileSystemOps>,
    /// Filesystem access for system paths (mutations through sudo).
    pub system_fs: Arc<dyn FileSystemOps>,
    /// Time source for backup names.
    pub clock: Arc<dyn Clock>,
    /// Distribution package manager.
    pub packages: Arc<dyn PackageManager>,
    /// System service manager.
    pub services: Arc<dyn ServiceManager>,
    /// Bootloader configuration.
    pub bootloader: Arc<dyn BootloaderConfig>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("assets", &self.assets)
            .field("executor", &"<dyn Executor>")
            .field("user_fs", &"<dyn FileSystemOps>")
            .field("system_fs", &"<dyn FileSystemOps>")
            .field("clock", &"<dyn Clock>")
            .field("packages", &self.packages.name())
            .field("services", &"<dyn ServiceManager>")
            .field("bootloader", &"<dyn BootloaderConfig>")
            .finish()
    }
}

impl Context {
    /// Creates a context wired to the host system.
    #[must_use]
    pub fn new(
        config: Config,
        platform: Platform,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        assets: PathBuf,
    ) -> Self {
        let packages: Arc<dyn PackageManager> =
            Arc::from(packages::for_family(platform.family, Arc::clone(&executor)));
        Self {
            config: Arc::new(config),
            log,
            dry_run,
            assets,
            user_fs: Arc::new(SystemFileSystemOps),
            system_fs: Arc::new(SudoFileSystemOps::new(Arc::clone(&executor))),
            clock: Arc::new(SystemClock),
            packages,
            services: Arc::new(Systemctl::new(Arc::clone(&executor))),
            bootloader: Arc::new(Grub::for_family(platform.family, Arc::clone(&executor))),
            platform: Arc::new(platform),
            executor,
        }
    }

    /// Path of an asset relative to the asset directory.
    #[must_use]
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets.join(relative)
    }
}
