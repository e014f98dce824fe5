//! dreampic CLI - Database migrations and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations (accounts table and session store)
//! dreampic-cli migrate up
//!
//! # Revert the latest migration
//! dreampic-cli migrate down
//!
//! # Drop all tables created by migrations
//! dreampic-cli reset
//! ```
//!
//! The database is configured like the web server: `DATABASE_URL`, or
//! `DB_HOSTNAME`, `DB_PORT`, `DB_DATABASE`, `DB_USERNAME` and `DB_PASSWORD`.
//! A `.env` file is loaded if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "dreampic-cli")]
#[command(author, version, about = "dreampic CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        direction: MigrateDirection,
    },
    /// Drop all tables created by migrations
    Reset,
}

#[derive(Subcommand)]
enum MigrateDirection {
    /// Apply all pending migrations
    Up,
    /// Revert the latest migration
    Down,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate { direction } => match direction {
            MigrateDirection::Up => commands::migrate::up().await?,
            MigrateDirection::Down => commands::migrate::down().await?,
        },
        Commands::Reset => commands::reset::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_down() {
        let cli = Cli::try_parse_from(["dreampic-cli", "migrate", "down"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate {
                direction: MigrateDirection::Down
            })
        ));
    }
}
