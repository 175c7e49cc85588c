//! appdeck: launch every local Streamlit-style app under a directory.
//!
//! # Usage
//!
//! ```text
//! appdeck run [--dry-run] [--json] [--html <file>]
//! appdeck list [--json] [--html <file>]
//! appdeck discover [--json]
//!
//! global: --root <dir> --config <file> --entry-point <name> --runtime <prog>
//!         --extra-arg <arg>... --port-range <start-end> --host <ip>
//!         --probe-target <host:port> --registry-file <file> --relaunch-dead
//!         --no-port-probe --max-depth <n> -v
//! ```

mod commands;
mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{discover::DiscoverArgs, list::ListArgs, run::RunArgs, settings::SettingsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "appdeck",
    version,
    about = "Discover local web apps, start each on its own port, and list where they live",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover apps, start the unregistered ones, save and show the registry.
    Run(RunArgs),

    /// Show the saved registry without discovering or starting anything.
    List(ListArgs),

    /// Show which directories would be treated as apps.
    Discover(DiscoverArgs),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.settings.verbose);

    match cli.command {
        Commands::Run(args) => args.run(&cli.settings),
        Commands::List(args) => args.run(&cli.settings),
        Commands::Discover(args) => args.run(&cli.settings),
    }
}
