//! SSH key pair provisioning for the share connection.
//!
//! The key is created once and never rotated: an existing file at the
//! configured path is left exactly as it is.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use inquire::Confirm;
use log::debug;

use crate::config::ShareConfig;
use crate::ui;

/// Generate a 4096-bit RSA key pair at `path` unless a key already exists.
///
/// Returns: Ok(true) if a new key was generated
pub fn ensure_key_pair(path: &Path, dry_run: bool) -> Result<bool> {
    if path.exists() {
        debug!("key already present at {}, leaving it untouched", path.display());
        ui::success(&format!("✓ SSH key already exists at {}", path.display()));
        return Ok(false);
    }

    if dry_run {
        ui::info(&format!(
            "Would generate a 4096-bit RSA key pair at {}",
            path.display()
        ));
        return Ok(false);
    }

    prepare_key_dir(path)?;
    generate_key(path)?;
    ui::success(&format!("✓ SSH key pair generated at {}", path.display()));
    Ok(true)
}

/// Create the key's parent directory with owner-only permissions (0700).
fn prepare_key_dir(key_path: &Path) -> Result<()> {
    let Some(dir) = key_path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create key directory {}", dir.display()))?;

    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(dir)
        .with_context(|| format!("Failed to read metadata for {}", dir.display()))?
        .permissions();
    perms.set_mode(0o700);
    fs::set_permissions(dir, perms)
        .with_context(|| format!("Failed to restrict permissions on {}", dir.display()))?;

    debug!("key directory {} ready (mode 700)", dir.display());
    Ok(())
}

fn generate_key(path: &Path) -> Result<()> {
    let output = Command::new("ssh-keygen")
        .arg("-t")
        .arg("rsa")
        .arg("-b")
        .arg("4096")
        .arg("-N")
        .arg("")
        .arg("-C")
        .arg("paperless-sshfs-share")
        .arg("-f")
        .arg(path)
        .output()
        .context("Failed to execute ssh-keygen")?;

    if !output.status.success() {
        anyhow::bail!(
            "ssh-keygen failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Offer to deploy the public key to the remote host via ssh-copy-id.
///
/// Transfer failure is reported but never fatal: the key may already be
/// deployed out-of-band. Skipped entirely in non-interactive mode.
pub fn offer_key_transfer(config: &ShareConfig, no_interaction: bool, dry_run: bool) -> Result<()> {
    if no_interaction {
        debug!("non-interactive mode, skipping key transfer");
        return Ok(());
    }

    let remote = format!("{}@{}", config.remote_user, config.remote_host);
    let wanted = Confirm::new(&format!("Copy the public key to {remote} now?"))
        .with_default(true)
        .with_help_message("Runs ssh-copy-id; you will be asked for the remote password once")
        .prompt()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

    if !wanted {
        ui::info("Skipping key transfer; deploy the public key manually if it is not on the remote yet");
        return Ok(());
    }

    let pubkey = pubkey_path(&config.identity_file);
    if dry_run {
        ui::info(&format!(
            "Would run: ssh-copy-id -i {} {remote}",
            pubkey.display()
        ));
        return Ok(());
    }

    let status = Command::new("ssh-copy-id")
        .arg("-i")
        .arg(&pubkey)
        .arg(&remote)
        .status()
        .context("Failed to execute ssh-copy-id")?;

    if status.success() {
        ui::success("✓ Public key deployed to the remote host");
    } else {
        ui::warn(&format!(
            "⚠ ssh-copy-id exited with {}; append {} to the remote authorized_keys manually, then continue",
            status.code().unwrap_or(-1),
            pubkey.display()
        ));
    }
    Ok(())
}

/// Sibling `.pub` file written by ssh-keygen next to the private key.
fn pubkey_path(identity_file: &Path) -> PathBuf {
    let mut name = OsString::from(identity_file.as_os_str());
    name.push(".pub");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_key_is_left_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let key_path = dir.path().join("id_rsa_share");
        fs::write(&key_path, "EXISTING PRIVATE KEY MATERIAL").expect("seed key");

        let generated = ensure_key_pair(&key_path, false).expect("ensure");

        assert!(!generated);
        let content = fs::read_to_string(&key_path).expect("read back");
        assert_eq!(content, "EXISTING PRIVATE KEY MATERIAL");
    }

    #[test]
    fn missing_key_dir_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let key_path = dir.path().join("nested").join(".ssh").join("id_rsa_share");

        prepare_key_dir(&key_path).expect("prepare");

        let ssh_dir = key_path.parent().expect("parent");
        assert!(ssh_dir.is_dir());
        let mode = fs::metadata(ssh_dir).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn pubkey_path_appends_pub_suffix() {
        assert_eq!(
            pubkey_path(Path::new("/root/.ssh/id_rsa_paperless_share")),
            PathBuf::from("/root/.ssh/id_rsa_paperless_share.pub")
        );
    }
}
