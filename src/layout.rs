//! Directory layout for the paperless data share.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ui;

/// Subdirectories created under the mount point, paired with the paperless
/// environment variable that should point at each.
pub const SHARE_DIRS: [(&str, &str); 4] = [
    ("PAPERLESS_CONSUMPTION_DIR", "consume"),
    ("PAPERLESS_DATA_DIR", "data"),
    ("PAPERLESS_MEDIA_DIR", "media"),
    ("PAPERLESS_TRASH_DIR", "trash"),
];

/// Create the share subdirectories (create-if-missing) and return the
/// environment variable assignments they imply.
///
/// Assumes the mount is already active: if it is not, the directories land
/// silently on the local disk and the earlier verification warning is the
/// only hint.
pub fn init_layout(mount_point: &Path, dry_run: bool) -> Result<Vec<(String, PathBuf)>> {
    let mut exports = Vec::with_capacity(SHARE_DIRS.len());
    for (var, dir) in SHARE_DIRS {
        let path = mount_point.join(dir);
        if dry_run {
            ui::info(&format!("Would create {}", path.display()));
        } else {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
        }
        exports.push((var.to_string(), path));
    }
    Ok(exports)
}
