//! Roster CLI - user roster service in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{import, serve, stats};

/// Roster - a small user roster service
#[derive(Parser)]
#[command(name = "roster", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides settings)
        #[arg(long)]
        bind: Option<String>,
        /// CSV file to load into the store before serving
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Import users from a CSV file and show the report
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Preview without storing
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show average age by name initial for users from CSV files
    Stats {
        /// CSV files, imported in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { bind, seed } => serve::run(bind, seed),
        Commands::Import { file, preview, json } => import::run(&file, preview, json),
        Commands::Stats { files, json } => stats::run(&files, json),
    }
}
