//! CLI argument parsing for paperless-sshfs-setup

use clap::Parser;

/// Command-line arguments
#[derive(Parser, Clone)]
#[command(name = "paperless-sshfs-setup")]
#[command(version, about = "Provision an SSHFS-backed data share for paperless-ngx")]
pub struct Cli {
    /// Show what would be done without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Non-interactive mode for scripted provisioning
    ///
    /// Accepts every built-in default without prompting. The advisory FUSE
    /// passthrough confirmation is assumed answered "yes", and the key
    /// transfer step is skipped.
    #[arg(long)]
    pub no_interaction: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
