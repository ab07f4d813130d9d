//! Package-manager collaborator: makes sure the sshfs binary is available.

use std::process::Command;

use anyhow::{Context, Result};
use log::debug;

use crate::ui;

const PACKAGE: &str = "sshfs";

/// Install sshfs through apt unless the binary is already on the search path.
pub fn ensure_sshfs(dry_run: bool) -> Result<()> {
    if let Ok(path) = which::which(PACKAGE) {
        debug!("sshfs already present at {}", path.display());
        ui::success(&format!("✓ sshfs available at {}", path.display()));
        return Ok(());
    }

    if dry_run {
        ui::info(&format!(
            "Would run: apt-get update && apt-get install -y {PACKAGE}"
        ));
        return Ok(());
    }

    ui::info("Installing sshfs...");
    run_apt(&["update"])?;
    run_apt(&["install", "-y", PACKAGE])?;
    ui::success("✓ sshfs installed");
    Ok(())
}

/// Run one apt-get invocation, streaming its output to the terminal.
fn run_apt(args: &[&str]) -> Result<()> {
    let status = Command::new("apt-get")
        .args(args)
        .env("DEBIAN_FRONTEND", "noninteractive")
        .status()
        .with_context(|| format!("Failed to execute apt-get {}", args.join(" ")))?;

    if !status.success() {
        anyhow::bail!(
            "apt-get {} failed with exit code {}",
            args.join(" "),
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}
