//! vsx-probe - report POWER7 VSX support for the running machine.
//!
//! Runs the trap-protected probe (at most once, cached) and prints what it
//! found, alongside the kernel's advisory HWCAP bits. `check` is the
//! scripting mode: silent, exit code 0 when VSX is usable, 1 when not.

use clap::{Parser, Subcommand, ValueEnum};
use vsx_probe::logging::init_logging;
use vsx_probe::report;

/// Runtime probe for POWER7 VSX unaligned vector load/store support
#[derive(Parser)]
#[command(name = "vsx-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full capability report (default)
    Report,

    /// Exit 0 if VSX is usable, 1 if not; prints nothing
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON for machine consumption
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Report => {
            let report = report::detect();
            match cli.format {
                OutputFormat::Json => match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("error: failed to serialize report: {err}");
                        std::process::exit(2);
                    }
                },
                OutputFormat::Text => {
                    println!("{}", report.summary());
                    println!("  os:                {}", report.os);
                    println!("  static vsx:        {}", report.static_vsx);
                    println!("  probing disabled:  {}", report.probing_disabled);
                    if let Some(snap) = &report.hwcap {
                        println!(
                            "  hwcap:             {:#018x} (vsx: {}, arch 2.06: {})",
                            snap.hwcap,
                            snap.has_vsx(),
                            snap.is_arch_2_06()
                        );
                        println!("  hwcap2:            {:#018x}", snap.hwcap2);
                    } else {
                        println!("  hwcap:             unavailable");
                    }
                    println!("  detected at:       {}", report.detected_at);
                }
            }
        }
        Commands::Check => {
            let available = vsx_probe::vsx_available();
            std::process::exit(if available { 0 } else { 1 });
        }
    }
}
