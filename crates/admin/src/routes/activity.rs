//! Activity log route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ActivityLogRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::ActivityEntry;
use crate::routes::AdminPage;
use crate::routes::pagination::{PageLinks, Pagination};
use crate::state::AppState;

/// Entries per page.
pub const ENTRIES_PER_PAGE: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub page: Option<i64>,
}

/// Activity log template.
#[derive(Template, WebTemplate)]
#[template(path = "activity.html")]
pub struct ActivityTemplate {
    pub page: AdminPage,
    pub entries: Vec<ActivityEntry>,
    pub pagination: Pagination,
    pub links: PageLinks,
}

/// Paginated audit trail, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    mut auth: RequireAdminAuth,
    Query(query): Query<ActivityQuery>,
) -> Result<ActivityTemplate, AppError> {
    let repo = ActivityLogRepository::new(state.pool());
    let pagination = Pagination::new(query.page, ENTRIES_PER_PAGE, repo.count().await?);
    let entries = repo.list(pagination.per_page, pagination.offset()).await?;

    Ok(ActivityTemplate {
        page: AdminPage::prepare(&mut auth, "activity").await?,
        entries,
        links: pagination.links(|page| format!("/admin/activity?page={page}")),
        pagination,
    })
}
