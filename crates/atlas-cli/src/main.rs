//! # atlas CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atlas_cli::audit::{run_audit, AuditArgs};
use atlas_cli::load_config;
use atlas_cli::place::{run_place, PlaceArgs};
use atlas_cli::profile::{run_profile, ProfileArgs};

/// Atlas gazetteer CLI.
///
/// Resolves country profiles, validates place writes against a snapshot,
/// and audits snapshots for hierarchy drift.
#[derive(Parser, Debug)]
#[command(name = "atlas", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the engine configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve, list, and normalize country profiles.
    Profile(ProfileArgs),

    /// Validate place creates and updates.
    Place(PlaceArgs),

    /// Check a snapshot for hierarchy and profile consistency.
    Audit(AuditArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Profile(args) => run_profile(args),
        Commands::Place(args) => run_place(args, &config),
        Commands::Audit(args) => run_audit(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
