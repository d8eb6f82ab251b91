//! Identity store seam for the auth guard.
//!
//! The guard only needs a handful of reads and best-effort writes. Keeping
//! them behind [`AuthStore`] lets the guard run against `PostgreSQL` in
//! production and an in-memory store in unit tests.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bitversity_core::UserId;

use crate::db::remember_tokens::RememberTokenRecord;
use crate::db::{ActivityLogRepository, RememberTokenRepository, RepositoryError, UserRepository};
use crate::models::activity::NewActivity;
use crate::models::user::AdminStatus;

/// Operations the auth guard performs against the identity store.
pub trait AuthStore: Send + Sync {
    /// Role and active flag of `user_id`, or `None` if the user doesn't exist.
    fn admin_status(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<AdminStatus>, RepositoryError>> + Send;

    /// Newest remember token of `user_id`, joined with the account.
    fn latest_remember_token(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<RememberTokenRecord>, RepositoryError>> + Send;

    fn touch_last_login(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn touch_last_logout(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove every remember token of `user_id`.
    fn delete_remember_tokens(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Append an audit entry.
    fn record_activity(
        &self,
        entry: NewActivity,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// [`AuthStore`] backed by the repositories.
#[derive(Clone, Copy)]
pub struct PgAuthStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgAuthStore<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl AuthStore for PgAuthStore<'_> {
    async fn admin_status(&self, user_id: UserId) -> Result<Option<AdminStatus>, RepositoryError> {
        UserRepository::new(self.pool).admin_status(user_id).await
    }

    async fn latest_remember_token(
        &self,
        user_id: UserId,
    ) -> Result<Option<RememberTokenRecord>, RepositoryError> {
        RememberTokenRepository::new(self.pool)
            .latest_for_user(user_id)
            .await
    }

    async fn touch_last_login(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        UserRepository::new(self.pool)
            .touch_last_login(user_id, at)
            .await
    }

    async fn touch_last_logout(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        UserRepository::new(self.pool)
            .touch_last_logout(user_id, at)
            .await
    }

    async fn delete_remember_tokens(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        RememberTokenRepository::new(self.pool)
            .delete_for_user(user_id)
            .await
    }

    async fn record_activity(&self, entry: NewActivity) -> Result<(), RepositoryError> {
        ActivityLogRepository::new(self.pool)
            .record(&entry)
            .await
            .map(|_| ())
    }
}
