//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bv-cli migrate
//! ```
//!
//! Applies `crates/admin/migrations/`, which cover the whole schema: users,
//! remember tokens, the activity log, orders and both session tables. The
//! servers never migrate on startup.

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
