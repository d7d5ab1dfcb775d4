//! qgrid CLI - tabular Q-learning and Dyna-Q on grid worlds
//!
//! This CLI provides a unified interface for:
//! - Training an agent over many episodes
//! - Stepping through individual updates with explanations
//! - Auto-running a session on a timer
//! - Listing the built-in grids

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qgrid")]
#[command(version, about = "Tabular Q-learning and Dyna-Q grid-world simulator", long_about = None)]
struct Cli {
    /// Verbosity: -v for episode logs, -vv for every step
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent for a number of episodes
    Train(qgrid::cli::commands::train::TrainArgs),

    /// Issue step commands and explain every update
    Step(qgrid::cli::commands::step::StepArgs),

    /// Issue step commands on a timer
    Autorun(qgrid::cli::commands::autorun::AutorunArgs),

    /// List the built-in grids
    Presets(qgrid::cli::commands::presets::PresetsArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => qgrid::cli::commands::train::execute(args),
        Commands::Step(args) => qgrid::cli::commands::step::execute(args),
        Commands::Autorun(args) => qgrid::cli::commands::autorun::execute(args),
        Commands::Presets(args) => qgrid::cli::commands::presets::execute(args),
    }
}
