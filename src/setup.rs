//! Top-level provisioning sequence.
//!
//! Stages run strictly in order; the first fatal error aborts the run. There
//! is no rollback of already-applied changes: an appended fstab entry stays
//! in place if a later stage fails, and a re-run is idempotent.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::ShareConfig;
use crate::{fstab, keys, layout, packages, preflight, ui};

pub fn run(cli: &Cli) -> Result<()> {
    ui::banner();

    preflight::run(cli.no_interaction).context("Preflight checks failed")?;
    ui::success("✓ Preflight checks passed");

    let config = if cli.no_interaction {
        ShareConfig::default()
    } else {
        ShareConfig::gather()?
    };
    config.validate()?;
    if !cli.no_interaction {
        config.review()?;
    }

    packages::ensure_sshfs(cli.dry_run)?;

    keys::ensure_key_pair(&config.identity_file, cli.dry_run)
        .context("SSH key provisioning failed")?;
    keys::offer_key_transfer(&config, cli.no_interaction, cli.dry_run)?;

    let entry = fstab::compose_entry(&config);
    fstab::persist_entry(Path::new(fstab::FSTAB_PATH), &entry, cli.dry_run)
        .context("Mount table update failed")?;

    ensure_mount_point(&config.mount_point, cli.dry_run)?;
    fstab::activate_mounts(cli.dry_run).context("Mount activation failed")?;

    let mount_verified = if cli.dry_run {
        false
    } else {
        match fstab::verify_mount(&config.mount_point) {
            Ok(true) => {
                ui::success(&format!("✓ Share mounted at {}", config.mount_point.display()));
                true
            }
            Ok(false) => {
                ui::warn(&format!(
                    "⚠ {} is not an active mount point; the directories created next will land on the local disk. \
                     Check the remote host, the deployed key and the container's FUSE feature, then re-run",
                    config.mount_point.display()
                ));
                false
            }
            Err(e) => {
                ui::warn(&format!("⚠ Could not verify the mount: {e:#}"));
                false
            }
        }
    };

    let exports = layout::init_layout(&config.mount_point, cli.dry_run)
        .context("Directory layout initialization failed")?;

    if cli.dry_run {
        ui::info("\nDry-run complete; nothing was changed");
        return Ok(());
    }

    ui::show_completion(&config, mount_verified, &exports);
    Ok(())
}

/// The mount point itself must exist before `mount -a` can attach to it.
fn ensure_mount_point(mount_point: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        ui::info(&format!("Would create mount point {}", mount_point.display()));
        return Ok(());
    }
    fs::create_dir_all(mount_point)
        .with_context(|| format!("Failed to create mount point {}", mount_point.display()))
}
