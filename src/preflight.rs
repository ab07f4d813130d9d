//! Environment precondition checks run before any side effect.
//!
//! Everything here must pass before the workflow touches the package
//! database, the key directory or the mount table.

use std::fs;

use inquire::Confirm;
use log::debug;
use thiserror::Error;

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Failures that abort setup before anything has been modified.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("must run as root (effective uid {0})")]
    NotRoot(u32),
    #[error("could not determine the host OS: {0}")]
    UnknownOs(String),
    #[error(
        "unsupported OS family \"{0}\": this workflow is only validated on Debian-based containers"
    )]
    UnsupportedOs(String),
    #[error(
        "FUSE passthrough not confirmed; enable it for the container (Proxmox: Options > Features > FUSE), restart it and re-run"
    )]
    FuseDeclined,
    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

/// Run all preflight checks in order: root privilege, OS family, FUSE
/// confirmation. The first failure aborts.
pub fn run(no_interaction: bool) -> Result<(), PreflightError> {
    check_root()?;
    check_os_family()?;
    confirm_fuse(no_interaction)?;
    Ok(())
}

fn check_root() -> Result<(), PreflightError> {
    let euid = nix::unistd::geteuid();
    if !euid.is_root() {
        return Err(PreflightError::NotRoot(euid.as_raw()));
    }
    Ok(())
}

/// Verify the container runs a Debian-family OS (apt is assumed later).
fn check_os_family() -> Result<(), PreflightError> {
    let content = fs::read_to_string(OS_RELEASE_PATH)
        .map_err(|e| PreflightError::UnknownOs(format!("{OS_RELEASE_PATH}: {e}")))?;
    let id = os_release_field(&content, "ID")
        .ok_or_else(|| PreflightError::UnknownOs(format!("no ID field in {OS_RELEASE_PATH}")))?;
    let id_like = os_release_field(&content, "ID_LIKE");
    debug!("os-release ID={id} ID_LIKE={id_like:?}");

    if is_debian_family(&id, id_like.as_deref()) {
        Ok(())
    } else {
        Err(PreflightError::UnsupportedOs(id))
    }
}

/// Extract one `KEY=value` field from os-release content, stripping quotes.
fn os_release_field(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix(key)?.strip_prefix('=')?;
        Some(value.trim_matches('"').to_string())
    })
}

fn is_debian_family(id: &str, id_like: Option<&str>) -> bool {
    if id == "debian" || id == "ubuntu" {
        return true;
    }
    id_like
        .map(|like| like.split_whitespace().any(|t| t == "debian"))
        .unwrap_or(false)
}

/// Advisory confirmation that the container has FUSE passthrough enabled.
///
/// This is a prompt, not a probe: a mistaken "yes" is undetected until the
/// mount step fails later.
fn confirm_fuse(no_interaction: bool) -> Result<(), PreflightError> {
    if no_interaction {
        debug!("non-interactive mode, assuming FUSE passthrough is enabled");
        return Ok(());
    }

    let enabled = Confirm::new("Is FUSE passthrough enabled for this container?")
        .with_default(true)
        .with_help_message(
            "Answering yes does not probe the feature; if it is actually off, mounting will fail",
        )
        .prompt()?;

    if enabled {
        Ok(())
    } else {
        Err(PreflightError::FuseDeclined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBIAN_OS_RELEASE: &str = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
NAME="Debian GNU/Linux"
VERSION_ID="12"
ID=debian
HOME_URL="https://www.debian.org/"
"#;

    const MINT_OS_RELEASE: &str = r#"NAME="Linux Mint"
ID=linuxmint
ID_LIKE="ubuntu debian"
"#;

    #[test]
    fn os_release_field_finds_unquoted_id() {
        assert_eq!(
            os_release_field(DEBIAN_OS_RELEASE, "ID").as_deref(),
            Some("debian")
        );
    }

    #[test]
    fn os_release_field_strips_quotes() {
        assert_eq!(
            os_release_field(MINT_OS_RELEASE, "ID_LIKE").as_deref(),
            Some("ubuntu debian")
        );
    }

    #[test]
    fn os_release_field_does_not_confuse_version_id_with_id() {
        let content = "VERSION_ID=\"12\"\nID=debian\n";
        assert_eq!(os_release_field(content, "ID").as_deref(), Some("debian"));
    }

    #[test]
    fn debian_and_ubuntu_ids_are_supported() {
        assert!(is_debian_family("debian", None));
        assert!(is_debian_family("ubuntu", None));
    }

    #[test]
    fn debian_derivatives_are_supported_via_id_like() {
        assert!(is_debian_family("linuxmint", Some("ubuntu debian")));
    }

    #[test]
    fn non_debian_families_are_rejected() {
        assert!(!is_debian_family("fedora", None));
        assert!(!is_debian_family("opensuse-leap", Some("suse")));
    }
}
