//! Persistent mount-table management for the SSHFS share.
//!
//! The composed fstab line is the unit of idempotence: it is appended at most
//! once, matched as an exact line, with the table backed up before the first
//! write. The read-modify-write cycle holds an exclusive lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use nix::fcntl::{Flock, FlockArg};

use crate::config::ShareConfig;
use crate::ui;

pub const FSTAB_PATH: &str = "/etc/fstab";

const PROC_MOUNTS: &str = "/proc/self/mounts";

/// Build the single-line fstab descriptor for the share.
///
/// `_netdev` defers the mount until networking is up; `allow_other` lets the
/// paperless service user see files under a root-owned mount.
pub fn compose_entry(config: &ShareConfig) -> String {
    format!(
        "sshfs#{}@{}:{} {} fuse defaults,_netdev,allow_other,IdentityFile={} 0 0",
        config.remote_user,
        config.remote_host,
        config.remote_path,
        config.mount_point.display(),
        config.identity_file.display()
    )
}

/// Exact-line membership test, the idempotence check for [`persist_entry`].
///
/// Deliberately not a semantic comparison: a reordered option set counts as a
/// different entry.
pub fn already_contains(table: &str, entry: &str) -> bool {
    table.lines().any(|line| line == entry)
}

/// Append `entry` to the mount table unless an identical line is present.
///
/// The untouched table is copied to a timestamped `.bak-` sibling before the
/// write; a no-op run leaves no backup behind.
///
/// Returns: Ok(true) if the entry was appended
pub fn persist_entry(table_path: &Path, entry: &str, dry_run: bool) -> Result<bool> {
    // Exclusive lock makes the whole read-modify-write cycle atomic.
    let lock_file = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(table_path)
        .with_context(|| format!("Failed to open {} for locking", table_path.display()))?;
    let _flock_guard = Flock::lock(lock_file, FlockArg::LockExclusive).map_err(|(_, err)| {
        anyhow::anyhow!(
            "Failed to acquire exclusive lock on {}: {}",
            table_path.display(),
            err
        )
    })?;

    let existing = fs::read_to_string(table_path)
        .with_context(|| format!("Failed to read {}", table_path.display()))?;

    if already_contains(&existing, entry) {
        debug!("entry already present in {}, skipping", table_path.display());
        ui::info(&format!(
            "Entry already present in {}, leaving the table unchanged",
            table_path.display()
        ));
        return Ok(false);
    }

    if dry_run {
        ui::info(&format!("Would append to {}: {entry}", table_path.display()));
        return Ok(false);
    }

    let backup = backup_table(table_path)?;
    ui::info(&format!("Backed up {} to {}", table_path.display(), backup.display()));

    let mut new_content = existing;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(entry);
    new_content.push('\n');

    write_table_atomic(table_path, &new_content)?;
    debug!("appended share entry to {}", table_path.display());
    ui::success(&format!("✓ Entry added to {}", table_path.display()));
    Ok(true)
}

/// Copy the table to a timestamped sibling before its first modification.
fn backup_table(table_path: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let backup = table_path.with_extension(format!("bak-{stamp}"));
    fs::copy(table_path, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            table_path.display(),
            backup.display()
        )
    })?;
    Ok(backup)
}

/// Write the table atomically using the temp file + rename pattern.
fn write_table_atomic(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to temp file")?;
        file.sync_all().context("Failed to sync temp file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;
    Ok(())
}

/// Mount everything described in the table.
///
/// A failure here is fatal with no rollback: the table may carry unrelated
/// entries and there is no way to tell which one failed.
pub fn activate_mounts(dry_run: bool) -> Result<()> {
    if dry_run {
        ui::info("Would run: mount -a");
        return Ok(());
    }

    let output = Command::new("mount")
        .arg("-a")
        .output()
        .context("Failed to execute mount -a")?;

    if !output.status.success() {
        anyhow::bail!(
            "mount -a failed with exit code {}: {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Best-effort check that `mount_point` is currently an active mount point.
pub fn verify_mount(mount_point: &Path) -> Result<bool> {
    let mounts =
        fs::read_to_string(PROC_MOUNTS).with_context(|| format!("Failed to read {PROC_MOUNTS}"))?;
    Ok(is_mount_listed(&mounts, mount_point))
}

/// Check whether `target` appears as a mount point (second field) in content
/// shaped like /proc/self/mounts.
fn is_mount_listed(mounts: &str, target: &Path) -> bool {
    let target = target.to_string_lossy();
    mounts.lines().any(|line| {
        let mut fields = line.split_whitespace();
        fields.next().is_some() && fields.next() == Some(target.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ShareConfig {
        ShareConfig {
            remote_user: "paperless".to_string(),
            remote_host: "192.168.1.10".to_string(),
            remote_path: "/srv/paperless_data".to_string(),
            mount_point: PathBuf::from("/mnt/paperless_data"),
            identity_file: PathBuf::from("/root/.ssh/id_rsa_paperless_share"),
        }
    }

    #[test]
    fn default_config_composes_documented_entry() {
        let entry = compose_entry(&ShareConfig::default());
        assert_eq!(
            entry,
            "sshfs#paperless@192.168.1.10:/srv/paperless_data /mnt/paperless_data fuse \
             defaults,_netdev,allow_other,IdentityFile=/root/.ssh/id_rsa_paperless_share 0 0"
        );
    }

    #[test]
    fn overridden_values_flow_into_entry() {
        let config = ShareConfig {
            remote_user: "docs".to_string(),
            remote_host: "nas.lan".to_string(),
            remote_path: "/tank/docs".to_string(),
            mount_point: PathBuf::from("/mnt/docs"),
            identity_file: PathBuf::from("/root/.ssh/id_rsa_docs"),
        };
        assert_eq!(
            compose_entry(&config),
            "sshfs#docs@nas.lan:/tank/docs /mnt/docs fuse \
             defaults,_netdev,allow_other,IdentityFile=/root/.ssh/id_rsa_docs 0 0"
        );
    }

    #[test]
    fn already_contains_matches_exact_lines_only() {
        let entry = compose_entry(&test_config());
        let table = format!("# /etc/fstab\nproc /proc proc defaults 0 0\n{entry}\n");

        assert!(already_contains(&table, &entry));
        // A substring or differently-optioned line is not a match.
        assert!(!already_contains(&table, "proc /proc proc"));
        assert!(!already_contains(
            &table,
            &entry.replace("defaults,_netdev", "_netdev,defaults")
        ));
    }

    #[test]
    fn persisting_twice_appends_exactly_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table_path = dir.path().join("fstab");
        fs::write(&table_path, "# test table\nproc /proc proc defaults 0 0\n").expect("seed");

        let entry = compose_entry(&test_config());
        assert!(persist_entry(&table_path, &entry, false).expect("first append"));
        assert!(!persist_entry(&table_path, &entry, false).expect("second run"));

        let table = fs::read_to_string(&table_path).expect("read back");
        assert_eq!(table.lines().filter(|line| *line == entry).count(), 1);
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn first_append_creates_a_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table_path = dir.path().join("fstab");
        fs::write(&table_path, "# test table\n").expect("seed");

        let entry = compose_entry(&test_config());
        persist_entry(&table_path, &entry, false).expect("append");

        let backups: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("fstab.bak-"))
            .collect();
        assert_eq!(backups.len(), 1);
        let backup_content = fs::read_to_string(backups[0].path()).expect("read backup");
        assert_eq!(backup_content, "# test table\n");
    }

    #[test]
    fn noop_run_leaves_no_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table_path = dir.path().join("fstab");
        let entry = compose_entry(&test_config());
        fs::write(&table_path, format!("{entry}\n")).expect("seed");

        assert!(!persist_entry(&table_path, &entry, false).expect("noop"));

        let backups = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("fstab.bak-"))
            .count();
        assert_eq!(backups, 0);
    }

    #[test]
    fn missing_trailing_newline_is_repaired_before_append() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table_path = dir.path().join("fstab");
        fs::write(&table_path, "proc /proc proc defaults 0 0").expect("seed");

        let entry = compose_entry(&test_config());
        persist_entry(&table_path, &entry, false).expect("append");

        let table = fs::read_to_string(&table_path).expect("read back");
        assert!(table.contains(&format!("proc /proc proc defaults 0 0\n{entry}\n")));
    }

    #[test]
    fn dry_run_does_not_modify_the_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table_path = dir.path().join("fstab");
        fs::write(&table_path, "# untouched\n").expect("seed");

        let entry = compose_entry(&test_config());
        assert!(!persist_entry(&table_path, &entry, true).expect("dry run"));

        assert_eq!(
            fs::read_to_string(&table_path).expect("read back"),
            "# untouched\n"
        );
    }

    #[test]
    fn mount_listing_matches_second_field() {
        let mounts = "\
sysfs /sys sysfs rw,nosuid 0 0
paperless@192.168.1.10:/srv/paperless_data /mnt/paperless_data fuse.sshfs rw,relatime 0 0
";
        assert!(is_mount_listed(mounts, Path::new("/mnt/paperless_data")));
        assert!(!is_mount_listed(mounts, Path::new("/mnt/other")));
        // The device field must not satisfy the check.
        assert!(!is_mount_listed(mounts, Path::new("sysfs")));
    }
}
