//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::{ActivityLogRepository, OrderRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{ActivityEntry, CustomerSpend, OrderStats, OrderSummary, StatusCount};
use crate::routes::AdminPage;
use crate::state::AppState;

const RECENT_ORDERS: i64 = 5;
const TOP_CUSTOMERS: i64 = 5;
const RECENT_ACTIVITY: i64 = 10;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub stats: OrderStats,
    pub status_counts: Vec<StatusCount>,
    pub recent_orders: Vec<OrderSummary>,
    pub top_customers: Vec<CustomerSpend>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Dashboard page handler.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    mut auth: RequireAdminAuth,
) -> Result<DashboardTemplate, AppError> {
    let orders = OrderRepository::new(state.pool());
    let activity = ActivityLogRepository::new(state.pool());

    let (stats, status_counts, recent_orders, top_customers, recent_activity) = tokio::try_join!(
        orders.stats(),
        orders.status_breakdown(),
        orders.recent(RECENT_ORDERS),
        orders.top_customers(TOP_CUSTOMERS),
        activity.recent(RECENT_ACTIVITY),
    )?;

    Ok(DashboardTemplate {
        page: AdminPage::prepare(&mut auth, "dashboard").await?,
        stats,
        status_counts,
        recent_orders,
        top_customers,
        recent_activity,
    })
}
