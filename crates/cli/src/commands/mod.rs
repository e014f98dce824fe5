//! CLI command implementations.

pub mod migrate;
pub mod reset;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use dreampic_web::config::{ConfigError, database_url_from_env};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store migration failed.
    #[error("Session store error: {0}")]
    SessionStore(String),
}

/// Connect using `DATABASE_URL` or the `DB_*` variables.
async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
