//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations, including the session table
//! dreampic-cli migrate up
//!
//! # Revert the most recently applied migration
//! dreampic-cli migrate down
//! ```
//!
//! # Migration Files
//!
//! Reversible migrations live in `crates/web/migrations/`:
//! ```text
//! migrations/
//! ├── 20240101000001_create_accounts.up.sql
//! └── 20240101000001_create_accounts.down.sql
//! ```

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

static MIGRATOR: Migrator = sqlx::migrate!("../web/migrations");

/// Apply pending migrations and create the session table.
pub async fn up() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool.clone())
        .migrate()
        .await
        .map_err(|e| CommandError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Revert the latest applied migration.
pub async fn down() -> Result<(), CommandError> {
    let pool = connect().await?;

    let applied = applied_versions(&pool).await?;
    let Some(latest) = applied.first() else {
        tracing::info!("No migrations to revert");
        return Ok(());
    };

    // Undo reverts every migration newer than the target
    let target = applied.get(1).copied().unwrap_or(0);

    tracing::info!(version = latest, "Reverting migration...");
    MIGRATOR.undo(&pool, target).await?;

    tracing::info!("Revert complete!");
    Ok(())
}

/// Applied migration versions, newest first (at most two).
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, CommandError> {
    let exists: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;
    if !exists {
        return Ok(Vec::new());
    }

    let versions = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version DESC LIMIT 2",
    )
    .fetch_all(pool)
    .await?;

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        let migrations: Vec<_> = MIGRATOR.iter().collect();
        assert!(!migrations.is_empty());
        assert!(
            migrations
                .iter()
                .any(|m| m.description.contains("create accounts"))
        );
    }
}
