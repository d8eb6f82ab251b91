//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bitversity_core::EmailError),

    /// Unknown email, wrong password, wrong role or disabled account.
    ///
    /// The causes are deliberately indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Password doesn't meet the strength rules.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Argon2 hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// The remember-token signing key was rejected.
    #[error("invalid token signing key")]
    TokenKey,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
