//! Remember-me token repository.
//!
//! Only the HMAC of a token reaches this table. Validity (expiry, role,
//! active flag, hash match) is decided by the auth guard, not in SQL, so a
//! failed check can always clear the cookie.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bitversity_core::{RememberTokenId, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::display_name;

/// The latest token of a user, joined with the owning account.
#[derive(Debug, Clone)]
pub struct RememberTokenRecord {
    pub id: RememberTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl RememberTokenRecord {
    /// Whether this token may still sign its owner in at `now`.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now && self.is_active && self.role.is_admin()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RememberTokenRow {
    id: i32,
    user_id: i32,
    token_hash: String,
    expires_at: DateTime<Utc>,
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    is_active: bool,
}

impl From<RememberTokenRow> for RememberTokenRecord {
    fn from(row: RememberTokenRow) -> Self {
        Self {
            id: RememberTokenId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: display_name(&row.first_name, &row.last_name, &row.email),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            email: row.email,
            role: row.role,
            is_active: row.is_active,
        }
    }
}

/// Repository for remember-me tokens.
pub struct RememberTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RememberTokenRepository<'a> {
    /// Create a new remember token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most recently issued token for `user_id`, with the owner's account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<RememberTokenRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, RememberTokenRow>(
            r"
            SELECT rt.id, rt.user_id, rt.token_hash, rt.expires_at,
                   u.email, u.first_name, u.last_name, u.role, u.is_active
            FROM remember_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.user_id = $1
            ORDER BY rt.created_at DESC, rt.id DESC
            LIMIT 1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Store a new token hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RememberTokenId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO remember_tokens (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id.as_i32())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(RememberTokenId::new(id))
    }

    /// Delete every token belonging to `user_id`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM remember_tokens WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete tokens that expired before `now`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM remember_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
