//! Logging initialization for the CLI.
//!
//! Human-readable console format on stderr so stdout stays clean for
//! machine output. Respects `RUST_LOG` when set; otherwise verbosity
//! flags pick the filter level.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs.
pub fn init_logging(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "vsx_probe=error"
    } else {
        match verbose {
            0 => "vsx_probe=warn",
            1 => "vsx_probe=info",
            2 => "vsx_probe=debug",
            _ => "vsx_probe=trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let use_ansi = std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(use_ansi)
        .init();
}
