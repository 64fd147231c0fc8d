//! Relaunch — rebuild a single-page app, mirror it to its bucket, purge the CDN.
//!
//! # Usage
//!
//! ```text
//! relaunch update [--project-dir <dir>] [--record <file>] [--json]
//! relaunch plan   [--project-dir <dir>] [--record <file>] [--json]
//! relaunch status [--project-dir <dir>] [--record <file>] [--json]
//! ```
//!
//! Logging goes to stderr; set `RELAUNCH_LOG` (e.g. `debug`) or pass `-v`.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{plan::PlanArgs, status::StatusArgs, update::UpdateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "relaunch",
    version,
    about = "Rebuild a static web app, mirror it to object storage and invalidate the CDN",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Overridden by RELAUNCH_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build, sync to the bucket and invalidate the CDN.
    Update(UpdateArgs),

    /// Build and show what `update` would upload and delete, without changing anything.
    Plan(PlanArgs),

    /// Show the deployment target recorded at provisioning time.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Update(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("RELAUNCH_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
