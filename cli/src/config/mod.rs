//! Run configuration: an optional TOML file layered over built-in defaults.
//!
//! Every section and key is optional. Paths may start with `~/`, which is
//! expanded against `$HOME` after loading.
pub mod toml_loader;

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// All settings for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Filesystem locations.
    pub paths: Paths,
    /// `tools` component.
    pub tools: Tools,
    /// `boot-theme` component.
    pub boot_theme: BootTheme,
    /// `prompt` component.
    pub prompt: Prompt,
    /// `keyboard` component.
    pub keyboard: Keyboard,
    /// `window-manager` component.
    pub window_manager: WindowManager,
    /// `autotiling` component.
    pub autotiling: Autotiling,
    /// `ssh-key` component.
    pub ssh: Ssh,
    /// `kernel` component.
    pub kernel: Kernel,
    /// Preflight checks.
    pub preflight: PreflightSettings,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Paths {
    /// Per-user configuration root (`$XDG_CONFIG_HOME` or `~/.config`).
    pub config_root: PathBuf,
    /// System-wide Plymouth theme directory.
    pub theme_root: PathBuf,
    /// Shell rc file that sources the generated environment.
    pub shell_rc: PathBuf,
    /// Asset directory; auto-detected when unset.
    pub assets: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            config_root: xdg_config_home(),
            theme_root: PathBuf::from("/usr/share/plymouth/themes"),
            shell_rc: home_dir().join(".bashrc"),
            assets: None,
        }
    }
}

/// `[tools]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
    /// Packages installed by the `tools` component.
    pub packages: Vec<String>,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            packages: ["git", "curl", "ripgrep", "htop", "tmux"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// `[boot_theme]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootTheme {
    /// Theme directory name under the assets' `plymouth/` and the theme root.
    pub theme: String,
    /// Package providing Plymouth.
    pub package: String,
}

impl Default for BootTheme {
    fn default() -> Self {
        Self {
            theme: "minimal".to_string(),
            package: "plymouth".to_string(),
        }
    }
}

/// `[prompt]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Prompt {
    /// Prompt package.
    pub package: String,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            package: "starship".to_string(),
        }
    }
}

/// `[keyboard]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Keyboard {
    /// Remapping daemon package.
    pub package: String,
    /// Service unit of the daemon.
    pub service: String,
    /// System-wide remapping configuration.
    pub config_path: PathBuf,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            package: "keyd".to_string(),
            service: "keyd".to_string(),
            config_path: PathBuf::from("/etc/keyd/default.conf"),
        }
    }
}

/// `[window_manager]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowManager {
    /// Window-manager configuration directory.
    pub config_dir: PathBuf,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self {
            config_dir: xdg_config_home().join("sway"),
        }
    }
}

/// `[autotiling]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Autotiling {
    /// Auto-tiling helper package.
    pub package: String,
}

impl Default for Autotiling {
    fn default() -> Self {
        Self {
            package: "autotiling".to_string(),
        }
    }
}

/// `[ssh]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ssh {
    /// Private key path.
    pub key_path: PathBuf,
    /// Key comment.
    pub comment: String,
}

impl Default for Ssh {
    fn default() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
        Self {
            key_path: home_dir().join(".ssh/id_ed25519"),
            comment: format!("{user}@postinstall"),
        }
    }
}

/// `[kernel]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Kernel {
    /// Alternate kernel package.
    pub package: String,
    /// Substring identifying the kernel's boot menu entry.
    pub menu_pattern: String,
}

impl Default for Kernel {
    fn default() -> Self {
        Self {
            package: "linux-zen".to_string(),
            menu_pattern: "zen".to_string(),
        }
    }
}

/// `[preflight]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreflightSettings {
    /// URL probed with an HTTP HEAD request.
    pub connectivity_url: String,
    /// Path whose filesystem must have free space.
    pub disk_path: PathBuf,
    /// Minimum free space in MiB.
    pub min_free_mib: u64,
}

impl Default for PreflightSettings {
    fn default() -> Self {
        Self {
            connectivity_url: "https://deb.debian.org/".to_string(),
            disk_path: PathBuf::from("/"),
            min_free_mib: 2048,
        }
    }
}

impl Config {
    /// Default config file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        xdg_config_home().join("postinstall").join("config.toml")
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default location may be absent, in
    /// which case built-in defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any file is
    /// malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = match path {
            Some(path) if !path.exists() => {
                bail!("config file not found: {}", path.display())
            }
            Some(path) => toml_loader::load_config(path)?,
            None => toml_loader::load_config(&Self::default_path())?,
        };
        Ok(config.expand_home(&home_dir()))
    }

    /// Expand a leading `~/` in every path setting.
    #[must_use]
    pub fn expand_home(mut self, home: &Path) -> Self {
        for path in [
            &mut self.paths.config_root,
            &mut self.paths.theme_root,
            &mut self.paths.shell_rc,
            &mut self.keyboard.config_path,
            &mut self.window_manager.config_dir,
            &mut self.ssh.key_path,
            &mut self.preflight.disk_path,
        ] {
            *path = expand_tilde(path, home);
        }
        if let Some(assets) = self.paths.assets.as_mut() {
            *assets = expand_tilde(assets, home);
        }
        self
    }
}

/// `$HOME`, or `/` when unset.
#[must_use]
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(|| PathBuf::from("/"), PathBuf::from)
}

/// `$XDG_CONFIG_HOME`, or `~/.config`.
#[must_use]
pub fn xdg_config_home() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home_dir().join(".config"), PathBuf::from)
}

fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    if path == Path::new("~") {
        return home.to_path_buf();
    }
    path.strip_prefix("~")
        .map_or_else(|_| path.to_path_buf(), |rest| home.join(rest))
}
