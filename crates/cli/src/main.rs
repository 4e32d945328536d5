//! Longbox CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! lb-cli migrate
//!
//! # Import a catalog dump (array or Marvel API response)
//! lb-cli seed comics.json
//!
//! # Show document counts
//! lb-cli stats
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(author, version, about = "Longbox CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import catalog documents into the comics collection
    Seed {
        /// Path to a JSON file
        file: String,
    },
    /// Show document counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::comics(&file).await,
        Commands::Stats => commands::stats::run().await,
    }
}
