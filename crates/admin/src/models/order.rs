//! Order views used by the dashboard and order management pages.

use chrono::{DateTime, Utc};

use bitversity_core::{Money, OrderId, OrderStatus, UserId};

/// One order row joined with its customer.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub customer_email: String,
    pub customer_name: String,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Headline dashboard numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub total_orders: i64,
    /// Sum of completed order totals.
    pub revenue: Money,
    pub completed_orders: i64,
    pub pending_orders: i64,
    /// Distinct users who placed at least one order.
    pub customers: i64,
}

impl OrderStats {
    /// Average value of a completed order.
    #[must_use]
    pub fn average_order_value(&self) -> Money {
        self.revenue.average_over(self.completed_orders)
    }
}

/// Number of orders in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// A customer ranked by completed spend.
#[derive(Debug, Clone)]
pub struct CustomerSpend {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub order_count: i64,
    pub total_spent: Money,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_average_order_value() {
        let stats = OrderStats {
            revenue: Money::new(Decimal::new(30000, 2)),
            completed_orders: 4,
            ..OrderStats::default()
        };
        assert_eq!(stats.average_order_value().to_string(), "$75.00");
        assert_eq!(OrderStats::default().average_order_value(), Money::ZERO);
    }
}
