//! Seed import command
//!
//! Usage: coffer seed import <PATH> [--db <PATH>]

use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::BackendArgs;

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file or a directory of seed files
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub fn execute(args: SeedArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args),
    }
}

fn execute_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::open_session(&args.backend.db, &args.backend.namespace)?;

    let mut seed_files = Vec::new();
    if args.path.is_dir() {
        // Sorted for determinism
        for entry in std::fs::read_dir(&args.path)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if is_yaml {
                seed_files.push(path);
            }
        }
        seed_files.sort();
    } else {
        seed_files.push(args.path.clone());
    }

    for seed_file in seed_files {
        println!("Importing {}...", seed_file.display());
        let pids = coffer_engine::seed::import_seed(&session, &seed_file)?;
        for pid in pids {
            println!("  imported {pid}");
        }
    }

    Ok(())
}
