//! Database operations for the Bitversity `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles and active flags (the identity store)
//! - `remember_tokens` - Hashed remember-me tokens
//! - `activity_log` - Append-only admin audit trail
//! - `orders` - Customer orders
//! - `tower_sessions.admin_session` / `tower_sessions.storefront_session` - Session records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p bitversity-cli -- migrate
//! ```

pub mod activity_log;
pub mod orders;
pub mod remember_tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity_log::ActivityLogRepository;
pub use orders::OrderRepository;
pub use remember_tokens::RememberTokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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
