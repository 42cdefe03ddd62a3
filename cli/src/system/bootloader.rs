//! GRUB menu lookup and `GRUB_DEFAULT` handling.
//!
//! Only what selecting a default kernel needs: find the entry id of a menu
//! entry by title and read or rewrite the `GRUB_DEFAULT` line.
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::exec::Executor;
use crate::platform::Family;

/// Access to the bootloader configuration.
#[cfg_attr(test, mockall::automock)]
pub trait BootloaderConfig: Send + Sync + std::fmt::Debug {
    /// Text of the generated boot menu (`grub.cfg`).
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be read.
    fn menu_config(&self) -> Result<String>;

    /// File holding the `GRUB_DEFAULT` setting.
    fn defaults_path(&self) -> PathBuf;

    /// Regenerate the boot menu from the defaults file and installed kernels.
    ///
    /// # Errors
    ///
    /// Returns an error if the regeneration command fails.
    fn regenerate(&self) -> Result<()>;
}

/// GRUB 2 with per-distribution paths.
#[derive(Debug)]
pub struct Grub {
    executor: Arc<dyn Executor>,
    menu_path: PathBuf,
    defaults_path: PathBuf,
    regenerate: Vec<&'static str>,
}

impl Grub {
    /// GRUB layout used by `family`.
    #[must_use]
    pub fn for_family(family: Family, executor: Arc<dyn Executor>) -> Self {
        let (menu_path, regenerate) = match family {
            Family::Debian => ("/boot/grub/grub.cfg", vec!["update-grub"]),
            Family::Arch => (
                "/boot/grub/grub.cfg",
                vec!["grub-mkconfig", "-o", "/boot/grub/grub.cfg"],
            ),
            Family::Fedora => (
                "/boot/grub2/grub.cfg",
                vec!["grub2-mkconfig", "-o", "/boot/grub2/grub.cfg"],
            ),
        };
        Self {
            executor,
            menu_path: PathBuf::from(menu_path),
            defaults_path: PathBuf::from("/etc/default/grub"),
            regenerate,
        }
    }

    /// Path of the generated menu.
    #[must_use]
    pub fn menu_path(&self) -> &Path {
        &self.menu_path
    }
}

impl BootloaderConfig for Grub {
    fn menu_config(&self) -> Result<String> {
        // grub.cfg is root-only on several distributions.
        let menu = self.menu_path.to_string_lossy();
        Ok(self.executor.run("sudo", &["cat", "--", &menu])?.stdout)
    }

    fn defaults_path(&self) -> PathBuf {
        self.defaults_path.clone()
    }

    fn regenerate(&self) -> Result<()> {
        self.executor.run("sudo", &self.regenerate)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Submenu,
    Entry,
    Other,
}

/// GRUB entry id of the first menu entry whose title contains `pattern`.
///
/// Top-level entries are numbered from `0` in file order; entries inside a
/// submenu are addressed as `"<submenu>><entry>"` (e.g. `"1>0"`), which is the
/// form `GRUB_DEFAULT` accepts.
#[must_use]
pub fn find_menu_entry(menu: &str, pattern: &str) -> Option<String> {
    let mut stack: Vec<Block> = Vec::new();
    // Next index at each submenu depth, and the indices of the open submenus.
    let mut counters: Vec<usize> = vec![0];
    let mut path: Vec<usize> = Vec::new();

    for line in menu.lines() {
        let trimmed = line.trim_start();
        let kind = if trimmed.starts_with("menuentry ") {
            Some(Block::Entry)
        } else if trimmed.starts_with("submenu ") {
            Some(Block::Submenu)
        } else {
            None
        };

        let mut braces = unquoted_braces(trimmed).into_iter();
        if let Some(kind) = kind {
            let depth = path.len();
            counters.truncate(depth + 1);
            counters.resize(depth + 1, 0);
            let index = counters.get(depth).copied().unwrap_or(0);
            if let Some(slot) = counters.get_mut(depth) {
                *slot += 1;
            }

            if kind == Block::Entry && quoted_title(trimmed).is_some_and(|t| t.contains(pattern)) {
                let mut id: Vec<String> = path.iter().map(ToString::to_string).collect();
                id.push(index.to_string());
                return Some(id.join(">"));
            }

            // The first brace on the line opens the entry itself.
            if braces.next() == Some('{') {
                stack.push(kind);
                if kind == Block::Submenu {
                    path.push(index);
                    counters.push(0);
                }
            }
        }

        for brace in braces {
            if brace == '{' {
                stack.push(Block::Other);
            } else if stack.pop() == Some(Block::Submenu) {
                path.pop();
                counters.truncate(path.len() + 1);
            }
        }
    }
    None
}

/// First single- or double-quoted string on a `menuentry`/`submenu` line.
fn quoted_title(line: &str) -> Option<&str> {
    let (_, from_quote) = line.split_at(line.find(['\'', '"'])?);
    let mut chars = from_quote.chars();
    let quote = chars.next()?;
    let rest = chars.as_str();
    rest.find(quote).map(|end| rest.split_at(end).0)
}

/// `{` and `}` characters outside quotes, in order.
fn unquoted_braces(line: &str) -> Vec<char> {
    let mut quote: Option<char> = None;
    let mut out = Vec::new();
    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '{' | '}') => out.push(c),
            (None, _) => {}
        }
    }
    out
}

/// Value of the active `GRUB_DEFAULT` setting, unquoted.
#[must_use]
pub fn default_entry(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix("GRUB_DEFAULT="))
        .last()
        .map(|value| value.trim().trim_matches(['"', '\'']).to_string())
}

/// `text` with `GRUB_DEFAULT` set to `id`, replacing every active
/// `GRUB_DEFAULT` line or appending one.
#[must_use]
pub fn with_default_entry(text: &str, id: &str) -> String {
    let setting = format!("GRUB_DEFAULT=\"{id}\"");
    let mut replaced = false;
    let mut lines: Vec<String> = text
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("GRUB_DEFAULT=") {
                replaced = true;
                setting.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(setting);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    const MENU: &str = r#"
### BEGIN /etc/grub.d/10_linux ###
function gfxmode {
	set gfxpayload="${1}"
}
if [ "${next_entry}" ] ; then
   set default="${next_entry}"
fi
menuentry 'Ubuntu' --class ubuntu --class gnu-linux $menuentry_id_option 'gnulinux-simple-1234' {
	recordfail
	if [ x$grub_platform = xxen ]; then insmod xzio; insmod lzopio; fi
	linux	/boot/vmlinuz-6.8.0-31-generic root=UUID=1234 ro quiet splash
}
submenu 'Advanced options for Ubuntu' $menuentry_id_option 'gnulinux-advanced-1234' {
	menuentry 'Ubuntu, with Linux 6.8.0-31-generic' --class ubuntu $menuentry_id_option 'gnulinux-6.8.0-31-generic-advanced-1234' {
		linux	/boot/vmlinuz-6.8.0-31-generic root=UUID=1234 ro quiet splash
	}
	menuentry 'Ubuntu, with Linux 6.8.0-31-generic (recovery mode)' --class ubuntu {
		linux	/boot/vmlinuz-6.8.0-31-generic root=UUID=1234 ro recovery nomodeset
	}
	menuentry 'Ubuntu, with Linux 6.9.3-zen1-1-zen' --class ubuntu {
		linux	/boot/vmlinuz-6.9.3-zen1-1-zen root=UUID=1234 ro quiet splash
	}
}
menuentry 'Memory test (memtest86+x64.efi)' {
	linux /boot/memtest86+x64.efi
}
"#;

    #[test]
    fn finds_top_level_entry() {
        assert_eq!(find_menu_entry(MENU, "Ubuntu"), Some("0".to_string()));
        assert_eq!(find_menu_entry(MENU, "Memory test"), Some("2".to_string()));
    }

    #[test]
    fn finds_entry_inside_submenu() {
        assert_eq!(find_menu_entry(MENU, "zen"), Some("1>2".to_string()));
        assert_eq!(
            find_menu_entry(MENU, "6.8.0-31-generic (recovery"),
            Some("1>1".to_string())
        );
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            find_menu_entry(MENU, "6.8.0-31-generic"),
            Some("1>0".to_string())
        );
    }

    #[test]
    fn missing_entry_is_none() {
        assert_eq!(find_menu_entry(MENU, "lts"), None);
        assert_eq!(find_menu_entry("", "zen"), None);
    }

    #[test]
    fn submenu_titles_are_not_entries() {
        assert_eq!(find_menu_entry(MENU, "Advanced options"), None);
    }

    #[test]
    fn reads_default_entry() {
        let text = "# GRUB_DEFAULT=saved\nGRUB_DEFAULT=0\nGRUB_TIMEOUT=5\n";
        assert_eq!(default_entry(text), Some("0".to_string()));
        assert_eq!(default_entry("GRUB_DEFAULT=\"1>2\"\n"), Some("1>2".to_string()));
        assert_eq!(default_entry("GRUB_TIMEOUT=5\n"), None);
    }

    #[test]
    fn rewrites_existing_default() {
        let text = "GRUB_DEFAULT=0\nGRUB_TIMEOUT=5\n";
        assert_eq!(
            with_default_entry(text, "1>2"),
            "GRUB_DEFAULT=\"1>2\"\nGRUB_TIMEOUT=5\n"
        );
    }

    #[test]
    fn appends_missing_default() {
        assert_eq!(
            with_default_entry("GRUB_TIMEOUT=5", "1>2"),
            "GRUB_TIMEOUT=5\nGRUB_DEFAULT=\"1>2\"\n"
        );
    }

    #[test]
    fn commented_default_is_kept() {
        let text = "# GRUB_DEFAULT=saved\nGRUB_DEFAULT=0\n";
        let out = with_default_entry(text, "2");
        assert!(out.starts_with("# GRUB_DEFAULT=saved\n"));
        assert_eq!(default_entry(&out), Some("2".to_string()));
    }

    #[test]
    fn grub_paths_per_family() {
        let executor: Arc<dyn Executor> = Arc::new(MockExecutor::with_responses(vec![]));
        let fedora = Grub::for_family(Family::Fedora, executor.clone());
        assert_eq!(fedora.menu_path(), Path::new("/boot/grub2/grub.cfg"));
        assert_eq!(fedora.defaults_path(), PathBuf::from("/etc/default/grub"));
        let debian = Grub::for_family(Family::Debian, executor);
        assert_eq!(debian.menu_path(), Path::new("/boot/grub/grub.cfg"));
    }

    #[test]
    fn regenerate_runs_family_command() {
        let executor = Arc::new(MockExecutor::ok(""));
        let grub = Grub::for_family(Family::Arch, executor.clone());
        grub.regenerate().unwrap();
        assert_eq!(
            executor.calls(),
            vec!["sudo grub-mkconfig -o /boot/grub/grub.cfg".to_string()]
        );
    }
}
