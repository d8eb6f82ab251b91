//! Order repository: dashboard aggregates, listing and status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bitversity_core::{Money, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{CustomerSpend, OrderStats, OrderSummary, StatusCount};
use crate::models::user::display_name;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: i32,
    order_number: String,
    user_id: i32,
    email: String,
    first_name: String,
    last_name: String,
    total_amount: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            customer_name: display_name(&row.first_name, &row.last_name, &row.email),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            customer_email: row.email,
            total: Money::new(row.total_amount),
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    revenue: Decimal,
    completed_orders: i64,
    pending_orders: i64,
    customers: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCountRow {
    status: OrderStatus,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerSpendRow {
    user_id: i32,
    email: String,
    first_name: String,
    last_name: String,
    order_count: i64,
    total_spent: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct StatusChangeRow {
    order_number: String,
    previous_status: OrderStatus,
}

const SUMMARY_SELECT: &str = r"
    SELECT o.id, o.order_number, o.user_id, u.email, u.first_name, u.last_name,
           o.total_amount, o.status, o.created_at
    FROM orders o
    JOIN users u ON u.id = o.user_id
";

/// Result of a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub order_number: String,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order queries.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Headline numbers for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT COUNT(*) AS total_orders,
                   COALESCE(SUM(total_amount) FILTER (WHERE status = 'completed'), 0) AS revenue,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed_orders,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending_orders,
                   COUNT(DISTINCT user_id) AS customers
            FROM orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(OrderStats {
            total_orders: row.total_orders,
            revenue: Money::new(row.revenue),
            completed_orders: row.completed_orders,
            pending_orders: row.pending_orders,
            customers: row.customers,
        })
    }

    /// Order count per status. Every status is present, zero when unused.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_breakdown(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(fill_status_counts(
            rows.into_iter().map(|r| StatusCount {
                status: r.status,
                count: r.count,
            }),
        ))
    }

    /// The `limit` newest orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<OrderSummary>, RepositoryError> {
        self.list(None, limit, 0).await
    }

    /// Newest orders first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            "{SUMMARY_SELECT} \
             WHERE ($1::order_status IS NULL OR o.status = $1) \
             ORDER BY o.created_at DESC, o.id DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Number of orders, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, status: Option<OrderStatus>) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE ($1::order_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Customers ranked by completed spend.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_customers(&self, limit: i64) -> Result<Vec<CustomerSpend>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerSpendRow>(
            r"
            SELECT u.id AS user_id, u.email, u.first_name, u.last_name,
                   COUNT(o.id) AS order_count,
                   COALESCE(SUM(o.total_amount), 0) AS total_spent
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.status = 'completed'
            GROUP BY u.id
            ORDER BY total_spent DESC, u.id
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CustomerSpend {
                user_id: UserId::new(r.user_id),
                name: display_name(&r.first_name, &r.last_name, &r.email),
                email: r.email,
                order_count: r.order_count,
                total_spent: Money::new(r.total_spent),
            })
            .collect())
    }

    /// Change an order's status.
    ///
    /// Returns `None` when the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>, RepositoryError> {
        let row = sqlx::query_as::<_, StatusChangeRow>(
            r"
            UPDATE orders o
            SET status = $2, updated_at = NOW()
            FROM (SELECT id, status FROM orders WHERE id = $1 FOR UPDATE) prev
            WHERE o.id = prev.id
            RETURNING o.order_number, prev.status AS previous_status
            ",
        )
        .bind(id.as_i32())
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| StatusChange {
            order_number: r.order_number,
            from: r.previous_status,
            to: status,
        }))
    }
}

/// Expand sparse per-status counts into one entry per status, in workflow order.
fn fill_status_counts(counts: impl IntoIterator<Item = StatusCount>) -> Vec<StatusCount> {
    let counts: Vec<StatusCount> = counts.into_iter().collect();
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: counts
                .iter()
                .find(|c| c.status == status)
                .map_or(0, |c| c.count),
        })
        .collect()
}
