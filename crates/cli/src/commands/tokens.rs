//! Remember-token maintenance.
//!
//! # Usage
//!
//! ```bash
//! bv-cli tokens purge
//! ```

use chrono::Utc;

use bitversity_admin::db::RememberTokenRepository;

use super::{CommandError, connect};

/// Delete every expired remember token.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the delete fails.
pub async fn purge() -> Result<u64, CommandError> {
    let pool = connect().await?;

    let deleted = RememberTokenRepository::new(&pool)
        .purge_expired(Utc::now())
        .await?;

    tracing::info!(deleted, "Expired remember tokens purged");
    Ok(deleted)
}
