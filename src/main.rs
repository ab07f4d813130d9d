//! paperless-ngx SSHFS share setup binary.
//!
//! One-shot, idempotent provisioning of a remote-backed data share inside a
//! Debian-based LXC container: preflight checks, interactive configuration,
//! sshfs package install, SSH key provisioning, persistent fstab entry,
//! mount activation and directory layout.

mod cli;
mod config;
mod fstab;
mod keys;
mod layout;
mod packages;
mod preflight;
mod setup;
mod ui;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = cli::Cli::parse_args();
    if let Err(e) = setup::run(&cli) {
        ui::error(&format!("❌ FATAL: {e:#}"));
        std::process::exit(1);
    }
}
