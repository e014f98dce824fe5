//! Account repository backed by `PostgreSQL`.
//!
//! Queries are checked at runtime so the crate builds without a database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dreampic_core::{Account, AccountId};

use super::{AccountStore, RepositoryError};

const PING_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    user_id: Uuid,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::new(row.id),
            user_id: row.user_id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

/// `AccountStore` over a connection pool.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_account(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO accounts (user_id, username)
            VALUES ($1, $2)
            RETURNING id, user_id, username, created_at
            ",
        )
        .bind(user_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("account already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn get_account_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, user_id, username, created_at
            FROM accounts
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_username(
        &self,
        id: AccountId,
        username: &str,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            UPDATE accounts
            SET username = $2
            WHERE id = $1
            RETURNING id, user_id, username, created_at
            ",
        )
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        tokio::time::timeout(PING_TIMEOUT, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|_| RepositoryError::Timeout(PING_TIMEOUT))??;
        Ok(())
    }
}
