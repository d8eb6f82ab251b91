//! Order management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use bitversity_core::{ActivityAction, FlashSeverity, OrderId, OrderStatus};

use crate::db::{ActivityLogRepository, OrderRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::activity::NewActivity;
use crate::models::{OrderSummary, StatusCount};
use crate::routes::AdminPage;
use crate::routes::pagination::{PageLinks, Pagination};
use crate::services::auth::ClientInfo;
use crate::state::AppState;

/// Orders per page.
pub const ORDERS_PER_PAGE: i64 = 25;

const ORDERS_PATH: &str = "/admin/orders";

// =============================================================================
// Query / Form Types
// =============================================================================

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// Status filter; empty or `all` shows every order.
    pub status: Option<String>,
    pub page: Option<i64>,
}

impl OrdersQuery {
    /// Parsed status filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status.
    pub fn status_filter(&self) -> Result<Option<OrderStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("" | "all") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("unknown order status: {raw}"))),
        }
    }
}

/// Status change form.
///
/// `filter` and `page` echo the list the form was rendered on, so the
/// redirect lands back on the same view.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub csrf_token: String,
}

impl StatusForm {
    /// The order list to return to. An unknown filter falls back to all
    /// orders.
    fn return_path(&self) -> String {
        let query = OrdersQuery {
            status: self.filter.clone(),
            page: self.page,
        };
        let filter = query.status_filter().ok().flatten();

        match (filter, self.page) {
            (None, None) => ORDERS_PATH.to_string(),
            (filter, page) => page_href(filter, page.unwrap_or(1).max(1)),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub page: AdminPage,
    pub orders: Vec<OrderSummary>,
    pub status_counts: Vec<StatusCount>,
    pub statuses: [OrderStatus; 5],
    /// `as_str()` of the active filter, empty for all.
    pub filter: String,
    pub pagination: Pagination,
    pub links: PageLinks,
}

/// Href of one page of the order list under a filter.
fn page_href(filter: Option<OrderStatus>, page: i64) -> String {
    match filter {
        Some(status) => format!("{ORDERS_PATH}?status={status}&page={page}"),
        None => format!("{ORDERS_PATH}?page={page}"),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Paginated order list.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    mut auth: RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate, AppError> {
    let filter = query.status_filter()?;
    let repo = OrderRepository::new(state.pool());

    let (total, status_counts) = tokio::try_join!(repo.count(filter), repo.status_breakdown())?;
    let pagination = Pagination::new(query.page, ORDERS_PER_PAGE, total);
    let orders = repo
        .list(filter, pagination.per_page, pagination.offset())
        .await?;

    Ok(OrdersTemplate {
        page: AdminPage::prepare(&mut auth, "orders").await?,
        orders,
        status_counts,
        statuses: OrderStatus::ALL,
        filter: filter.map(|s| s.as_str().to_string()).unwrap_or_default(),
        links: pagination.links(|page| page_href(filter, page)),
        pagination,
    })
}

/// Change an order's status.
#[instrument(skip(state, auth, headers, form))]
pub async fn update_status(
    State(state): State<AppState>,
    mut auth: RequireAdminAuth,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    if !auth.admin.validate_csrf(&form.csrf_token) {
        warn!(order_id = id, "Status change rejected: CSRF token mismatch");
        return Err(AppError::invalid_csrf());
    }

    let back = Redirect::to(&form.return_path()).into_response();

    let Ok(status) = form.status.parse::<OrderStatus>() else {
        auth.admin
            .set_flash("Unknown order status.", FlashSeverity::Error);
        auth.save().await?;
        return Ok(back);
    };

    match OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await?
    {
        Some(change) => {
            let client = ClientInfo::from_headers(&headers);
            let entry = NewActivity {
                user_id: auth.admin.user_id,
                action: ActivityAction::OrderStatusChanged,
                description: format!(
                    "Order {} status changed from {} to {}",
                    change.order_number, change.from, change.to
                ),
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            };
            if let Err(e) = ActivityLogRepository::new(state.pool()).record(&entry).await {
                warn!(order_id = id, error = %e, "Failed to write activity log");
            }

            info!(order_id = id, from = %change.from, to = %change.to, "Order status changed");
            auth.admin.set_flash(
                format!("Order {} marked as {}.", change.order_number, change.to.label()),
                FlashSeverity::Success,
            );
        }
        None => auth
            .admin
            .set_flash("Order not found.", FlashSeverity::Error),
    }

    auth.save().await?;
    Ok(back)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(status: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            status: status.map(String::from),
            page: None,
        }
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(query(None).status_filter().unwrap(), None);
        assert_eq!(query(Some("")).status_filter().unwrap(), None);
        assert_eq!(query(Some("all")).status_filter().unwrap(), None);
        assert_eq!(
            query(Some("refunded")).status_filter().unwrap(),
            Some(OrderStatus::Refunded)
        );
        assert!(matches!(
            query(Some("shipped")).status_filter(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_page_href() {
        assert_eq!(page_href(None, 2), "/admin/orders?page=2");
        assert_eq!(
            page_href(Some(OrderStatus::Pending), 3),
            "/admin/orders?status=pending&page=3"
        );
    }

    fn status_form(filter: Option<&str>, page: Option<i64>) -> StatusForm {
        StatusForm {
            status: "completed".to_string(),
            filter: filter.map(String::from),
            page,
            csrf_token: String::new(),
        }
    }

    #[test]
    fn test_return_path_keeps_filter_and_page() {
        assert_eq!(
            status_form(Some("pending"), Some(2)).return_path(),
            "/admin/orders?status=pending&page=2"
        );
        assert_eq!(
            status_form(Some(""), Some(3)).return_path(),
            "/admin/orders?page=3"
        );
        assert_eq!(status_form(None, None).return_path(), ORDERS_PATH);
    }

    #[test]
    fn test_return_path_drops_unknown_filter_and_bad_page() {
        assert_eq!(
            status_form(Some("https://evil.example"), Some(0)).return_path(),
            "/admin/orders?page=1"
        );
        assert_eq!(status_form(Some("shipped"), None).return_path(), ORDERS_PATH);
    }
}
