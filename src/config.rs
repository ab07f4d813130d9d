//! Share configuration gathered from the interactive wizard.

use std::path::PathBuf;

use anyhow::Result;
use inquire::{Confirm, Text};

use crate::ui;

pub const DEFAULT_REMOTE_USER: &str = "paperless";
pub const DEFAULT_REMOTE_HOST: &str = "192.168.1.10";
pub const DEFAULT_REMOTE_PATH: &str = "/srv/paperless_data";
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/paperless_data";
// The tool requires root, so the key lives under root's home.
pub const DEFAULT_IDENTITY_FILE: &str = "/root/.ssh/id_rsa_paperless_share";

/// Connection and mount settings for the paperless data share.
///
/// Built once with defaults, optionally overridden interactively, then
/// read-only for the rest of the run. Never persisted: re-run the tool to
/// provision with different answers.
#[derive(Debug, Clone)]
pub struct ShareConfig {
    pub remote_user: String,
    pub remote_host: String,
    pub remote_path: String,
    pub mount_point: PathBuf,
    pub identity_file: PathBuf,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            remote_user: DEFAULT_REMOTE_USER.to_string(),
            remote_host: DEFAULT_REMOTE_HOST.to_string(),
            remote_path: DEFAULT_REMOTE_PATH.to_string(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            identity_file: PathBuf::from(DEFAULT_IDENTITY_FILE),
        }
    }
}

impl ShareConfig {
    /// Gather settings interactively, offering each built-in default as the
    /// initial answer.
    pub fn gather() -> Result<Self> {
        let remote_user = prompt_value("Remote SSH user", DEFAULT_REMOTE_USER)?;
        let remote_host = prompt_value("Remote host (IP or name)", DEFAULT_REMOTE_HOST)?;
        let remote_path = prompt_value("Remote data path", DEFAULT_REMOTE_PATH)?;
        let mount_point = prompt_value("Local mount point", DEFAULT_MOUNT_POINT)?;
        let identity_file = prompt_value("Private key path", DEFAULT_IDENTITY_FILE)?;

        Ok(Self {
            remote_user,
            remote_host,
            remote_path,
            mount_point: PathBuf::from(mount_point),
            identity_file: PathBuf::from(identity_file),
        })
    }

    /// Every field must be non-empty before provisioning proceeds. No other
    /// validation: host reachability and path shape are the operator's call.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("remote user", self.remote_user.as_str()),
            ("remote host", self.remote_host.as_str()),
            ("remote path", self.remote_path.as_str()),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                anyhow::bail!("Configuration value for {name} must not be empty");
            }
        }
        if self.mount_point.as_os_str().is_empty() {
            anyhow::bail!("Configuration value for mount point must not be empty");
        }
        if self.identity_file.as_os_str().is_empty() {
            anyhow::bail!("Configuration value for private key path must not be empty");
        }
        Ok(())
    }

    /// Echo the final configuration and require explicit confirmation.
    ///
    /// This is the one abort point before any destructive action occurs.
    pub fn review(&self) -> Result<()> {
        println!("\n📋 Share configuration:");
        println!("  • Remote user:  {}", self.remote_user);
        println!("  • Remote host:  {}", self.remote_host);
        println!("  • Remote path:  {}", self.remote_path);
        println!("  • Mount point:  {}", self.mount_point.display());
        println!("  • Identity key: {}", self.identity_file.display());
        println!();

        let proceed = Confirm::new("Proceed with these settings?")
            .with_default(true)
            .prompt()
            .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

        if !proceed {
            ui::info("Setup aborted before any change was made");
            anyhow::bail!("Setup cancelled by user");
        }
        Ok(())
    }
}

/// Prompt for one setting; empty input falls back to the default.
fn prompt_value(label: &str, default: &str) -> Result<String> {
    let answer = Text::new(label)
        .with_default(default)
        .prompt()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

    let answer = answer.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ShareConfig::default();
        assert_eq!(config.remote_user, "paperless");
        assert_eq!(config.remote_host, "192.168.1.10");
        assert_eq!(config.remote_path, "/srv/paperless_data");
        assert_eq!(config.mount_point, PathBuf::from("/mnt/paperless_data"));
        assert_eq!(
            config.identity_file,
            PathBuf::from("/root/.ssh/id_rsa_paperless_share")
        );
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(ShareConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_fields_are_rejected() {
        let mut config = ShareConfig::default();
        config.remote_host = String::new();
        assert!(config.validate().is_err());

        let mut config = ShareConfig::default();
        config.mount_point = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
