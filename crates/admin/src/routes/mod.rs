//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to the dashboard
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Password login (rate limited)
//! POST /auth/logout               - Logout
//!
//! # Back-office (requires auth)
//! GET  /admin                     - Dashboard
//! GET  /admin/orders              - Order list (?status=&page=)
//! POST /admin/orders/{id}/status  - Change order status
//! GET  /admin/activity            - Activity log (?page=)
//! ```

pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod pagination;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_sessions::SessionStore;

use bitversity_core::Flash;

use crate::error::AppError;
use crate::middleware::{
    RequireAdminAuth, create_session_layer, login_rate_limiter, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Shared layout data for authenticated pages.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub admin_name: String,
    /// Needed by the logout form in the header.
    pub csrf_token: String,
    pub flash: Option<Flash>,
    /// Highlighted navigation entry.
    pub nav: &'static str,
}

impl AdminPage {
    /// Take the pending flash, make sure a CSRF token exists, and persist both.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be written.
    pub async fn prepare(auth: &mut RequireAdminAuth, nav: &'static str) -> Result<Self, AppError> {
        let csrf_token = auth.admin.csrf_token().to_string();
        let flash = auth.admin.pop_flash();
        auth.save().await?;

        Ok(Self {
            admin_name: auth.admin.display_name().to_string(),
            csrf_token,
            flash,
            nav,
        })
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let submit = match login_rate_limiter() {
        Some(limiter) => post(auth::login).layer(limiter),
        None => {
            tracing::warn!("Login rate limiter unavailable; serving login without it");
            post(auth::login)
        }
    };

    Router::new()
        .route("/login", get(auth::login_page).merge(submit))
        .route("/logout", post(auth::logout))
}

/// Create the back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/activity", get(activity::index))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

/// The full application: routes, static assets, sessions and security headers.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config().is_https());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
