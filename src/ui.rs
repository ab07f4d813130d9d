//! Colored status output for the setup workflow.
//!
//! Four status levels: informational (cyan), success (green), warning
//! (yellow) and error (red). Warnings and errors go to stderr. Color is
//! dropped automatically when the stream is not a terminal.

use std::io::Write;
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::ShareConfig;

fn paint(stream: &mut StandardStream, color: Color, bold: bool, line: &str) {
    let _ = stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
    let _ = writeln!(stream, "{line}");
    let _ = stream.reset();
}

/// Informational status line
pub fn info(line: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    paint(&mut stdout, Color::Cyan, false, line);
}

/// Success status line
pub fn success(line: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    paint(&mut stdout, Color::Green, false, line);
}

/// Warning line (non-fatal), written to stderr
pub fn warn(line: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    paint(&mut stderr, Color::Yellow, false, line);
}

/// Error line, written to stderr
pub fn error(line: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    paint(&mut stderr, Color::Red, true, line);
}

/// Display welcome banner
pub fn banner() {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    );
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "\n            paperless-ngx SSHFS share setup");
    let _ = stdout.reset();

    let _ = writeln!(stdout, "\nThis will:");
    let _ = writeln!(stdout, "  • install sshfs if it is missing");
    let _ = writeln!(stdout, "  • generate an SSH key for the share (unless one exists)");
    let _ = writeln!(stdout, "  • add a persistent /etc/fstab entry (table backed up first)");
    let _ = writeln!(stdout, "  • mount the share and create the paperless directories\n");

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n"
    );
    let _ = stdout.reset();
}

/// Display setup completion summary
///
/// Prints what was provisioned and the paperless environment values implied
/// by the directory layout, for manual insertion into the application's
/// environment configuration.
pub fn show_completion(
    config: &ShareConfig,
    mount_verified: bool,
    exports: &[(String, PathBuf)],
) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    );
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n                    ✓ SETUP COMPLETE\n");
    let _ = stdout.reset();

    let _ = writeln!(stdout, "Share:");
    let _ = writeln!(
        stdout,
        "  {}@{}:{} on {}",
        config.remote_user,
        config.remote_host,
        config.remote_path,
        config.mount_point.display()
    );

    let _ = writeln!(stdout, "\nMount status:");
    if mount_verified {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        let _ = writeln!(stdout, "  ✓ Active at {}", config.mount_point.display());
        let _ = stdout.reset();
    } else {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(
            stdout,
            "  ⚠ Not verified; the directories below may live on the local disk"
        );
        let _ = stdout.reset();
    }

    let _ = writeln!(stdout, "\nSet these values in the paperless environment:");
    for (var, path) in exports {
        let _ = writeln!(stdout, "  {}={}", var, path.display());
    }

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n"
    );
    let _ = stdout.reset();
}
