//! `bv-cli` subcommands.

pub mod admin;
pub mod migrate;
pub mod tokens;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use bitversity_admin::db::RepositoryError;
use bitversity_admin::services::auth::AdminAuthError;
use bitversity_core::EmailError;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid command argument.
    #[error("Invalid {0}: {1}")]
    InvalidArgument(&'static str, String),

    /// Password rules or hashing.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("ADMIN_DATABASE_URL"))
}

/// Connect to the Bitversity database.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(bitversity_admin::db::create_pool(&url).await?)
}
