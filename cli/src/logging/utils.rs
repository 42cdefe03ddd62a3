//! Log file location and naming.
use std::ffi::OsString;
use std::path::PathBuf;

/// Runs naming more components than this share one log per mode.
const MAX_SCOPED_COMPONENTS: usize = 3;

/// Log name for a run: the mode, plus the selected components when there are
/// only a few of them.
///
/// `install` with `[kernel]` logs to `install-kernel`; a status probe of the
/// whole registry logs to `status`.
#[must_use]
pub fn log_name(command: &str, components: &[&str]) -> String {
    if components.is_empty() || components.len() > MAX_SCOPED_COMPONENTS {
        return command.to_string();
    }
    format!("{command}-{}", components.join("+"))
}

/// `<state dir>/postinstall/<name>.log`.
pub(super) fn log_file_path(name: &str) -> PathBuf {
    log_dir(std::env::var_os("XDG_STATE_HOME"), std::env::var_os("HOME"))
        .join(format!("{name}.log"))
}

/// `$XDG_STATE_HOME/postinstall`, else `~/.local/state/postinstall`.
fn log_dir(state_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    state_home
        .filter(|v| !v.is_empty())
        .map_or_else(
            || {
                home.map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".local/state")
            },
            PathBuf::from,
        )
        .join("postinstall")
}

/// Local wall-clock time, the same clock backups are named by.
pub(super) fn timestamp(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn few_components_scope_the_log_name() {
        assert_eq!(log_name("install", &["kernel"]), "install-kernel");
        assert_eq!(
            log_name("uninstall", &["prompt", "window-manager"]),
            "uninstall-prompt+window-manager"
        );
    }

    #[test]
    fn broad_runs_share_the_mode_log() {
        assert_eq!(log_name("status", &[]), "status");
        assert_eq!(
            log_name("install", &["tools", "prompt", "keyboard", "kernel"]),
            "install"
        );
    }

    #[test]
    fn state_home_wins_over_home() {
        assert_eq!(
            log_dir(Some("/var/state".into()), Some("/home/ada".into())),
            PathBuf::from("/var/state/postinstall")
        );
    }

    #[test]
    fn empty_state_home_falls_back_to_home() {
        assert_eq!(
            log_dir(Some(OsString::new()), Some("/home/ada".into())),
            PathBuf::from("/home/ada/.local/state/postinstall")
        );
        assert_eq!(
            log_dir(None, None),
            PathBuf::from("./.local/state/postinstall")
        );
    }

    #[test]
    fn timestamp_uses_requested_format() {
        let stamp = timestamp("%H:%M:%S");
        assert_eq!(stamp.len(), 8);
        assert_eq!(&stamp[2..3], ":");
    }
}
