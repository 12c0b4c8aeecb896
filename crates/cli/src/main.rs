//! Orchard CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! orchard-cli migrate
//!
//! # Create an admin account
//! orchard-cli seed admin -e admin@example.com -p 'a-strong-password' -f Ada -l Lovelace
//!
//! # Drop expired rows from the token denylist
//! orchard-cli purge-tokens
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed admin` - Create an admin account
//! - `purge-tokens` - Delete expired denylist entries

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchard-cli")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed database records
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Delete expired entries from the token denylist
    PurgeTokens,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create an admin account
    Admin {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (hashed before storage)
        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(short = 'f', long)]
        first_name: String,

        /// Last name
        #[arg(short = 'l', long)]
        last_name: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Admin {
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::seed::admin(&email, &password, &first_name, &last_name).await?;
            }
        },
        Commands::PurgeTokens => commands::purge::expired_tokens().await?,
    }
    Ok(())
}
