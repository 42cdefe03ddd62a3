//! Command-line interface.
use clap::Parser;
use std::path::PathBuf;

use crate::commands::Mode;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "postinstall",
    about = "Idempotent post-installation setup for a Linux desktop",
    version,
    override_usage = "postinstall [OPTIONS] [uninstall] <COMPONENT>...",
    after_help = crate::components::usage_table()
)]
pub struct Cli {
    /// Components to install, or `uninstall` followed by components to remove
    #[arg(value_name = "COMPONENT")]
    pub args: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/postinstall/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Asset directory (themes and configuration files to install)
    #[arg(long, value_name = "PATH")]
    pub assets: Option<PathBuf>,

    /// Print whether each component is installed and exit
    #[arg(long)]
    pub status: bool,
}

impl Cli {
    /// Nothing requested: print usage and succeed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.args.is_empty() && !self.status
    }

    /// Mode implied by the arguments, used to name the log file before
    /// validation.
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::guess(&self.args, self.status)
    }
}
