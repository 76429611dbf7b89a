//! Coffer CLI
//!
//! Command-line interface for the coffer object repository

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "coffer")]
#[command(about = "Coffer - digital object repository engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Show an object and its datastreams
    Show(commands::show::ShowArgs),
    /// Index projection operations
    Index(commands::index::IndexArgs),
}

fn main() {
    coffer_core::logging_facility::init(coffer_core::logging_facility::Profile::Development);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Seed(args) => commands::seed::execute(args),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Index(args) => commands::index::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
