//! CLI entry point definition.
use clap::Parser;

/// Top-level CLI for the environment installer.
///
/// Without mode flags the installer asks interactively and may re-exec
/// itself under sudo for a global install.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "homeset",
    about = "Personal environment installer for Linux",
    version
)]
pub struct Cli {
    /// Install locally, just for the current user
    #[arg(long, conflicts_with = "global")]
    pub local: bool,

    /// Install system-wide (requires root)
    #[arg(long)]
    pub global: bool,

    /// Primary (non-root) user of the system; only used for global installs
    #[arg(long, requires = "global", conflicts_with = "local")]
    pub user: Option<String>,

    /// Assume the default answer at every confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the payload root directory
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,
}
