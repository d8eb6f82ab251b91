//! Static content page route handlers.
//!
//! Serves the markdown pages loaded into the [`ContentStore`] at startup.
//!
//! [`ContentStore`]: crate::content::ContentStore

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::NaiveDate;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct ContentPageTemplate {
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
fn serve_content_page(state: &AppState, slug: &str) -> Result<ContentPageTemplate, AppError> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    })
}

/// Display the Help Center.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state))]
pub async fn help(State(state): State<AppState>) -> Result<ContentPageTemplate, AppError> {
    serve_content_page(&state, "help")
}

/// Display the Privacy Policy page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state))]
pub async fn privacy(State(state): State<AppState>) -> Result<ContentPageTemplate, AppError> {
    serve_content_page(&state, "privacy")
}

/// Display the Terms of Service page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state))]
pub async fn terms(State(state): State<AppState>) -> Result<ContentPageTemplate, AppError> {
    serve_content_page(&state, "terms")
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/help", get(help))
        .route("/privacy", get(privacy))
        .route("/terms", get(terms))
}
