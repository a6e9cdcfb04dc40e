//! snapkit CLI
//!
//! Maintenance commands for snapshot files

use clap::{Parser, Subcommand};
use snapkit_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "snapkit")]
#[command(about = "snapkit - snapshot file maintenance", long_about = None)]
struct Cli {
    /// Human-readable debug logs on stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// JSON logs on stderr
    #[arg(long, global = true, conflicts_with = "verbose")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite a snapshot file with its keys sorted
    Sort(commands::resave::SortArgs),
    /// Rewrite a snapshot file in canonical form
    Resave(commands::resave::ResaveArgs),
    /// Remove snapshots no test of a run produced
    Prune(commands::prune::PruneArgs),
    /// Print the entries of a snapshot file as JSON
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init(Profile::Development);
    } else if cli.json_logs {
        init(Profile::Production);
    }

    let result = match cli.command {
        Commands::Sort(args) => commands::resave::execute_sort(args),
        Commands::Resave(args) => commands::resave::execute_resave(args),
        Commands::Prune(args) => commands::prune::execute(args),
        Commands::Show(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
