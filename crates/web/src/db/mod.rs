//! Database operations for the web `PostgreSQL`.
//!
//! ## Tables
//!
//! - `accounts` - One profile row per auth-provider user
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p dreampic-cli -- migrate up
//! ```

pub mod accounts;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use dreampic_core::{Account, AccountId};

pub use accounts::PgAccountStore;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second account for the same user).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database did not answer in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Persistence for user accounts.
///
/// Handlers and middleware only see this trait, so tests can swap in an
/// in-memory store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the account for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has an account.
    async fn create_account(&self, user_id: Uuid, username: &str)
    -> Result<Account, RepositoryError>;

    /// Look up a user's account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn get_account_by_user_id(&self, user_id: Uuid)
    -> Result<Option<Account>, RepositoryError>;

    /// Change an account's username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    async fn update_username(
        &self,
        id: AccountId,
        username: &str,
    ) -> Result<Account, RepositoryError>;

    /// Check that the database answers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` if it takes longer than a second.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
