//! Activity log repository (append-only audit trail).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bitversity_core::{ActivityLogId, UserId};

use super::RepositoryError;
use crate::models::activity::{ActivityEntry, NewActivity};

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: i32,
    user_id: Option<i32>,
    user_email: Option<String>,
    action_type: String,
    description: String,
    ip_address: String,
    user_agent: String,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: ActivityLogId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            user_email: row.user_email,
            action_type: row.action_type,
            description: row.description,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

/// Repository for the activity log.
pub struct ActivityLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, entry: &NewActivity) -> Result<ActivityLogId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO activity_log (user_id, action_type, description, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(entry.user_id.map(|id| id.as_i32()))
        .bind(entry.action.as_str())
        .bind(&entry.description)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(self.pool)
        .await?;

        Ok(ActivityLogId::new(id))
    }

    /// Newest entries first, paged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r"
            SELECT a.id, a.user_id, u.email AS user_email, a.action_type, a.description,
                   a.ip_address, a.user_agent, a.created_at
            FROM activity_log a
            LEFT JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The `limit` most recent entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, RepositoryError> {
        self.list(limit, 0).await
    }

    /// Total number of entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activity_log")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
