//! Drop everything the migrations created.
//!
//! # Usage
//!
//! ```bash
//! dreampic-cli reset
//! ```

use super::{CommandError, connect};

/// Tables dropped by `reset`, in order.
const TABLES: &[&str] = &["accounts", "_sqlx_migrations", "tower_sessions.session"];

/// Drop the application, migration and session tables.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    for table in TABLES {
        tracing::info!(table, "Dropping table");
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("Reset complete!");
    Ok(())
}
