//! Shell environment contributed by components.
//!
//! Components never touch the shell rc directly. Each returns an
//! [`EnvironmentPatch`]; the driver merges the patches of every component
//! that should be present after the run, renders them once into
//! `<config_root>/postinstall/env.sh`, and makes the shell rc source it.
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::backup::Clock;
use crate::operations::FileSystemOps;
use crate::resources::file::FileResource;
use crate::resources::line::LineResource;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Environment additions from one or more components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentPatch {
    /// Directories prepended to `PATH`, in order.
    pub path_prepend: Vec<String>,
    /// Exported variables.
    pub variables: BTreeMap<String, String>,
    /// Lines appended verbatim (e.g. prompt initialisation).
    pub shell_init: Vec<String>,
}

impl EnvironmentPatch {
    /// Whether the patch contributes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path_prepend.is_empty() && self.variables.is_empty() && self.shell_init.is_empty()
    }

    /// Add a `PATH` prefix.
    #[must_use]
    pub fn prepend_path(mut self, dir: impl Into<String>) -> Self {
        self.path_prepend.push(dir.into());
        self
    }

    /// Add an exported variable.
    #[must_use]
    pub fn export(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Add a shell initialisation line.
    #[must_use]
    pub fn init_line(mut self, line: impl Into<String>) -> Self {
        self.shell_init.push(line.into());
        self
    }

    /// Fold `other` into `self`. Duplicate path entries and init lines are
    /// kept once; a later variable value wins.
    pub fn merge(&mut self, other: Self) {
        for dir in other.path_prepend {
            if !self.path_prepend.contains(&dir) {
                self.path_prepend.push(dir);
            }
        }
        self.variables.extend(other.variables);
        for line in other.shell_init {
            if !self.shell_init.contains(&line) {
                self.shell_init.push(line);
            }
        }
    }

    /// Render as a POSIX shell snippet.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("# Generated by postinstall. Changes are overwritten.\n");
        for dir in &self.path_prepend {
            // write! to a String is infallible.
            writeln!(
                out,
                "case \":$PATH:\" in *\":{dir}:\"*) ;; *) PATH=\"{dir}:$PATH\" ;; esac"
            )
            .unwrap_or(());
        }
        if !self.path_prepend.is_empty() {
            out.push_str("export PATH\n");
        }
        for (name, value) in &self.variables {
            writeln!(out, "export {name}={}", shell_quote(value)).unwrap_or(());
        }
        for line in &self.shell_init {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Double-quote `value`, escaping characters special inside double quotes.
/// `$HOME` and other expansions stay live.
fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Where the rendered environment lives and which rc file sources it.
#[derive(Debug, Clone)]
pub struct EnvironmentTarget {
    /// Rendered snippet (`<config_root>/postinstall/env.sh`).
    pub script: PathBuf,
    /// Shell rc file.
    pub shell_rc: PathBuf,
}

impl EnvironmentTarget {
    /// Standard locations under `config_root`.
    #[must_use]
    pub fn new(config_root: &Path, shell_rc: &Path) -> Self {
        Self {
            script: config_root.join("postinstall").join("env.sh"),
            shell_rc: shell_rc.to_path_buf(),
        }
    }

    /// The line added to the rc file.
    #[must_use]
    pub fn source_line(&self) -> String {
        format!(". \"{}\"", self.script.display())
    }

    fn resources<'a>(
        &self,
        patch: &EnvironmentPatch,
        fs: &'a dyn FileSystemOps,
        clock: &'a dyn Clock,
    ) -> (FileResource<'a>, LineResource<'a>) {
        (
            FileResource::content(patch.render(), self.script.clone(), fs, clock),
            LineResource::new(self.source_line(), self.shell_rc.clone(), fs, clock),
        )
    }

    /// Whether the files already reflect `patch`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be inspected.
    pub fn is_current(
        &self,
        patch: &EnvironmentPatch,
        fs: &dyn FileSystemOps,
        clock: &dyn Clock,
    ) -> Result<bool> {
        let (script, line) = self.resources(patch, fs, clock);
        if patch.is_empty() {
            return Ok(!fs.exists(&self.script)
                && !matches!(line.current_state()?, ResourceState::Correct));
        }
        Ok(script.current_state()? == ResourceState::Correct
            && line.current_state()? == ResourceState::Correct)
    }

    /// Write `patch` and make the rc file source it; an empty patch removes
    /// both the snippet and the source line.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn apply(
        &self,
        patch: &EnvironmentPatch,
        fs: &dyn FileSystemOps,
        clock: &dyn Clock,
    ) -> Result<ResourceChange> {
        let (script, line) = self.resources(patch, fs, clock);
        let changes = if patch.is_empty() {
            let line_change = if matches!(line.current_state()?, ResourceState::Correct) {
                line.remove()?
            } else {
                ResourceChange::AlreadyCorrect
            };
            let script_change = if fs.exists(&self.script) {
                fs.remove(&self.script)?;
                ResourceChange::Applied
            } else {
                ResourceChange::AlreadyCorrect
            };
            [script_change, line_change]
        } else {
            [script.apply()?, line.apply()?]
        };
        Ok(if changes.contains(&ResourceChange::Applied) {
            ResourceChange::Applied
        } else {
            ResourceChange::AlreadyCorrect
        })
    }
}
